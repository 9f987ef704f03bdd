//! Plain-text rendering of controller state for terminal front-ends.

use crate::models::{AnalysisResult, DiseasePrediction, Doctor, Message, MessageRole};

/// `0.42` -> `"42.0%"`
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}

/// One line per candidate, in the order the service ranked them
pub fn disease_lines(diseases: &[DiseasePrediction]) -> Vec<String> {
    diseases
        .iter()
        .enumerate()
        .map(|(i, disease)| {
            let label = match disease.distinct_translation() {
                Some(translated) => format!("{} ({})", disease.disease_label, translated),
                None => disease.disease_label.clone(),
            };
            format!("{:>2}. {} - {}", i + 1, label, format_confidence(disease.confidence))
        })
        .collect()
}

pub fn message(message: &Message) -> String {
    let speaker = match message.role {
        MessageRole::User => "You",
        MessageRole::Assistant => "Assistant",
    };
    let mut out = format!("{}: {}", speaker, message.content);

    if let Some(diseases) = message.diseases.as_deref().filter(|d| !d.is_empty()) {
        out.push_str("\n  Possible conditions:");
        for line in disease_lines(diseases) {
            out.push_str("\n  ");
            out.push_str(&line);
        }
    }
    out
}

pub fn analysis(result: &AnalysisResult) -> String {
    format!("Detected: {}\n\n{}", result.disease_label, result.details)
}

pub fn doctor(doctor: &Doctor) -> String {
    let name = if doctor.name.trim().is_empty() {
        "Unnamed doctor"
    } else {
        doctor.name.trim()
    };
    let mut lines = vec![name.to_string()];

    let affiliation = [doctor.specialization.as_deref(), doctor.hospital.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" @ ");
    if !affiliation.is_empty() {
        lines.push(affiliation);
    }
    if let Some(address) = &doctor.address {
        let address = address.to_string();
        if !address.is_empty() {
            lines.push(address);
        }
    }
    if !doctor.contact_number.trim().is_empty() {
        lines.push(format!("Tel: {}", doctor.contact_number.trim()));
    }
    if let Some(rating) = doctor.rating {
        lines.push(format!("Rating: {:.1}/5", rating));
    }

    lines.join("\n    ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Address, PostalAddress};

    fn prediction(label: &str, translated: Option<&str>, confidence: f64) -> DiseasePrediction {
        DiseasePrediction {
            disease_label: label.to_string(),
            translated_label: translated.map(str::to_string),
            confidence,
        }
    }

    #[test]
    fn confidence_has_one_decimal() {
        assert_eq!(format_confidence(0.42), "42.0%");
        assert_eq!(format_confidence(0.1), "10.0%");
        assert_eq!(format_confidence(0.0567), "5.7%");
        assert_eq!(format_confidence(1.0), "100.0%");
    }

    #[test]
    fn diseases_render_in_service_order() {
        let diseases = vec![
            prediction("Diabetes", Some("Diabète"), 0.42),
            prediction("Malaria", Some("Malaria"), 0.31),
            prediction("Migraine", None, 0.10),
        ];

        assert_eq!(
            disease_lines(&diseases),
            vec![
                " 1. Diabetes (Diabète) - 42.0%",
                " 2. Malaria - 31.0%",
                " 3. Migraine - 10.0%",
            ]
        );
    }

    #[test]
    fn assistant_message_lists_conditions() {
        let reply = Message::assistant(
            "Expected Disease: Diabetes",
            Some(vec![prediction("Diabetes", None, 0.42)]),
        );
        assert_eq!(
            message(&reply),
            "Assistant: Expected Disease: Diabetes\n  Possible conditions:\n   1. Diabetes - 42.0%"
        );
        assert_eq!(message(&Message::user("thirsty")), "You: thirsty");
    }

    #[test]
    fn doctor_summary_skips_missing_parts() {
        let entry = Doctor {
            name: "Dr. Salma Nour".to_string(),
            specialization: Some("Dermatology".to_string()),
            hospital: Some("Alexandria Medical Center".to_string()),
            address: Some(Address::Postal(PostalAddress {
                line1: "5 Fouad St".to_string(),
                line2: None,
                city: "Alexandria".to_string(),
                state: String::new(),
                country: "Egypt".to_string(),
                zip: "21500".to_string(),
            })),
            contact_number: String::new(),
            rating: Some(4.8),
        };

        assert_eq!(
            doctor(&entry),
            "Dr. Salma Nour\n    Dermatology @ Alexandria Medical Center\n    5 Fouad St, Alexandria 21500, Egypt\n    Rating: 4.8/5"
        );
    }
}
