// libs/notification-cell/src/services/messages.rs
use crate::models::{BookingSummary, EmailMessage};

pub struct BookingMessages;

impl BookingMessages {
    pub fn admin_alert(summary: &BookingSummary, admin_email: &str) -> EmailMessage {
        let subject = format!(
            "New booking: {} on {} ({})",
            summary.client_name, summary.appointment_date, summary.appointment_time
        );

        let mut lines = vec![
            format!("Client: {}", summary.client_name),
            format!("Email: {}", summary.client_email),
            format!("Phone: {}", summary.client_phone),
        ];
        lines.extend(Self::detail_lines(summary));
        lines.push(format!("Appointment id: {}", summary.appointment_id));
        lines.push("Status: PENDING - confirm it from the back office.".to_string());

        EmailMessage {
            to: admin_email.to_string(),
            subject,
            html_body: Self::render_html("New booking request", &lines),
            text_body: lines.join("\n"),
        }
    }

    pub fn client_confirmation(summary: &BookingSummary) -> EmailMessage {
        let subject = format!(
            "We received your booking for {} ({})",
            summary.appointment_date, summary.appointment_time
        );

        let mut lines = vec![format!("Hi {},", summary.client_name)];
        lines.push("Your booking request was received and is pending confirmation.".to_string());
        lines.extend(Self::detail_lines(summary));
        lines.push("We will contact you shortly to confirm.".to_string());

        EmailMessage {
            to: summary.client_email.clone(),
            subject,
            html_body: Self::render_html("Booking received", &lines),
            text_body: lines.join("\n"),
        }
    }

    fn detail_lines(summary: &BookingSummary) -> Vec<String> {
        let mut lines = vec![
            format!("Date: {}", summary.appointment_date),
            format!("Time: {}", summary.appointment_time),
        ];

        let services = summary.services
            .iter()
            .map(|line| if line.quantity > 1 {
                format!("{} x{}", line.name, line.quantity)
            } else {
                line.name.clone()
            })
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("Services: {}", services));

        match (&summary.district, &summary.address) {
            (Some(district), Some(address)) => {
                lines.push(format!("Location: home service, {} ({})", address, district));
            }
            _ => lines.push("Location: studio".to_string()),
        }

        lines.push(format!("Estimated duration: {} min", summary.total_duration));
        lines.push(format!("Total: S/ {}", summary.total_price.round_dp(2)));
        lines
    }

    fn render_html(title: &str, lines: &[String]) -> String {
        let body = lines
            .iter()
            .map(|line| format!("<p>{}</p>", escape_html(line)))
            .collect::<String>();
        format!("<h2>{}</h2>{}", escape_html(title), body)
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SummaryLine;
    use rust_decimal::Decimal;

    fn summary() -> BookingSummary {
        BookingSummary {
            appointment_id: "apt-1".into(),
            client_name: "Lucía <script>".into(),
            client_email: "lucia@example.com".into(),
            client_phone: "987 654 321".into(),
            appointment_date: "2025-12-20".into(),
            appointment_time: "21:00 - 23:00".into(),
            location_type: "HOME".into(),
            district: Some("Miraflores".into()),
            address: Some("Av. Larco 123".into()),
            services: vec![
                SummaryLine { name: "Social".into(), quantity: 2 },
                SummaryLine { name: "Peinado".into(), quantity: 1 },
            ],
            total_price: Decimal::from(250),
            total_duration: 240,
        }
    }

    #[test]
    fn test_admin_alert_contents() {
        let message = BookingMessages::admin_alert(&summary(), "owner@studio.pe");

        assert_eq!(message.to, "owner@studio.pe");
        assert!(message.subject.contains("2025-12-20"));
        assert!(message.text_body.contains("Phone: 987 654 321"));
        assert!(message.text_body.contains("Services: Social x2, Peinado"));
        assert!(message.text_body.contains("Av. Larco 123 (Miraflores)"));
        assert!(message.text_body.contains("Total: S/ 250"));
    }

    #[test]
    fn test_client_confirmation_goes_to_client() {
        let message = BookingMessages::client_confirmation(&summary());

        assert_eq!(message.to, "lucia@example.com");
        assert!(message.text_body.contains("pending confirmation"));
    }

    #[test]
    fn test_html_is_escaped() {
        let message = BookingMessages::client_confirmation(&summary());

        assert!(!message.html_body.contains("<script>"));
        assert!(message.html_body.contains("Lucía &lt;script&gt;"));
    }

    #[test]
    fn test_studio_location_line() {
        let mut studio = summary();
        studio.district = None;
        studio.address = None;

        let message = BookingMessages::client_confirmation(&studio);
        assert!(message.text_body.contains("Location: studio"));
    }
}
