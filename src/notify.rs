//! Email notifications for weather changes, thresholds, and reminders.
//!
//! Two alert policies coexist: relative significant-change detection (score
//! delta or condition flip) and absolute per-field thresholds. The background
//! loop applies both; which one fires for a given event depends only on the
//! configured limits.

use anyhow::Context;
use lettre::{
    Message, Transport,
    message::Mailbox,
    transport::smtp::{SmtpTransport, authentication::Credentials},
};

use crate::config::NotificationsConfig;
use crate::error::EventCastError;
use crate::models::{Event, WeatherObservation};
use crate::scoring::{Condition, HourlyScore, ScoreBreakdown};

/// True when the score moved at least `threshold_pct` points or the
/// condition label changed. First-time scores are never significant.
#[must_use]
pub fn is_significant_change(
    previous_score: Option<f64>,
    previous_condition: Option<Condition>,
    current: &ScoreBreakdown,
    threshold_pct: f64,
) -> bool {
    let Some(previous_score) = previous_score else {
        return false;
    };
    if (current.score - previous_score).abs() >= threshold_pct {
        return true;
    }
    previous_condition.is_some_and(|condition| condition != current.condition)
}

/// Absolute per-field limit violations for one observation.
#[must_use]
pub fn threshold_violations(
    observation: &WeatherObservation,
    config: &NotificationsConfig,
) -> Vec<String> {
    let mut violations = Vec::new();

    if let Some(temperature) = observation.temperature {
        if temperature < config.temperature_min {
            violations.push(format!(
                "Temperature {temperature:.1}°C is below the {:.0}°C limit",
                config.temperature_min
            ));
        } else if temperature > config.temperature_max {
            violations.push(format!(
                "Temperature {temperature:.1}°C exceeds the {:.0}°C limit",
                config.temperature_max
            ));
        }
    }

    if let Some(wind) = observation.wind_speed {
        if wind > config.wind_limit {
            violations.push(format!(
                "Wind speed {wind:.1} m/s exceeds the {:.0} m/s limit",
                config.wind_limit
            ));
        }
    }

    violations
}

fn format_value(value: Option<f64>, unit: &str) -> String {
    value
        .map(|v| format!("{v:.1}{unit}"))
        .unwrap_or_else(|| "n/a".to_string())
}

/// Body of a significant-change alert. Reports the raw weather values the
/// score was computed from, not the per-factor sub-scores.
fn change_alert_body(event: &Event, previous_score: Option<f64>, current: &ScoreBreakdown) -> String {
    let previous = previous_score
        .map(|score| format!("{score:.1}"))
        .unwrap_or_else(|| "n/a".to_string());
    format!(
        "Weather outlook for \"{}\" on {} has changed.\n\n\
         Suitability score: {} -> {:.1} ({})\n\
         Temperature: {} | Wind: {} | Precipitation: {}\n\n\
         Consider checking alternative dates.",
        event.name,
        event.date.format("%Y-%m-%d %H:%M UTC"),
        previous,
        current.score,
        current.condition.as_str(),
        format_value(current.temperature.value, "°C"),
        format_value(current.wind.value, " m/s"),
        format_value(current.precipitation.value, " mm"),
    )
}

/// SMTP-backed notifier. Absent when credentials are not configured.
pub struct Notifier {
    mailer: SmtpTransport,
    from: Mailbox,
}

impl Notifier {
    /// Build a notifier from configuration. Returns `Ok(None)` when SMTP
    /// credentials are missing, which disables notifications cleanly.
    pub fn from_config(config: &NotificationsConfig) -> anyhow::Result<Option<Self>> {
        let (Some(username), Some(password)) = (
            config.smtp_username.clone(),
            config.smtp_password.clone(),
        ) else {
            tracing::info!("SMTP credentials not configured; notifications disabled");
            return Ok(None);
        };

        let from_address = config.from_address.clone().unwrap_or_else(|| username.clone());
        let from: Mailbox = format!("EventCast <{from_address}>")
            .parse()
            .context("Failed to parse from address")?;

        let credentials = Credentials::new(username, password);
        let mailer = SmtpTransport::relay(&config.smtp_host)?
            .credentials(credentials)
            .build();

        Ok(Some(Notifier { mailer, from }))
    }

    fn send(&self, to: &str, subject: &str, body: String) -> Result<(), EventCastError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(to
                .parse()
                .map_err(|e| EventCastError::notification(format!("Invalid recipient: {e}")))?)
            .subject(subject)
            .body(body)
            .map_err(|e| EventCastError::notification(format!("Failed to build email: {e}")))?;

        self.mailer
            .send(&email)
            .map_err(|e| EventCastError::notification(format!("Failed to send email: {e}")))?;

        tracing::info!(to, subject, "sent notification email");
        Ok(())
    }

    /// Alert about a significant score or condition change.
    pub fn send_change_alert(
        &self,
        event: &Event,
        previous_score: Option<f64>,
        current: &ScoreBreakdown,
    ) -> Result<(), EventCastError> {
        let Some(to) = &event.email else {
            return Ok(());
        };

        let body = change_alert_body(event, previous_score, current);
        self.send(to, &format!("Weather change for {}", event.name), body)
    }

    /// Alert about absolute threshold violations.
    pub fn send_threshold_alert(
        &self,
        event: &Event,
        violations: &[String],
    ) -> Result<(), EventCastError> {
        let Some(to) = &event.email else {
            return Ok(());
        };
        if violations.is_empty() {
            return Ok(());
        }

        let body = format!(
            "Weather limits exceeded for \"{}\" on {}:\n\n{}\n",
            event.name,
            event.date.format("%Y-%m-%d %H:%M UTC"),
            violations.join("\n"),
        );
        self.send(to, &format!("Weather alert for {}", event.name), body)
    }

    /// Reminder with an hourly breakdown of the event day.
    pub fn send_reminder(
        &self,
        event: &Event,
        hourly: &[HourlyScore],
    ) -> Result<(), EventCastError> {
        let Some(to) = &event.email else {
            return Ok(());
        };

        let mut body = format!(
            "Reminder: \"{}\" takes place on {}.\n",
            event.name,
            event.date.format("%Y-%m-%d %H:%M UTC"),
        );
        if let (Some(score), Some(condition)) = (event.weather_score, event.weather_condition) {
            body.push_str(&format!(
                "Current outlook: {score:.1} ({})\n",
                condition.as_str()
            ));
        }
        if !hourly.is_empty() {
            body.push_str("\nHour-by-hour:\n");
            for hour in hourly {
                let temperature = hour
                    .temperature
                    .map(|t| format!("{t:.1}°C"))
                    .unwrap_or_else(|| "n/a".to_string());
                body.push_str(&format!(
                    "  {}  {:>6}  {:>5.1}  {}\n",
                    hour.time, temperature, hour.score, hour.description
                ));
            }
        }
        self.send(to, &format!("Reminder: {}", event.name), body)
    }
}
