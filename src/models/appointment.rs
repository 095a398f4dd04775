use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentDetails {
    pub client_name: String,
    #[serde(default)]
    pub client_first: String,
    #[serde(default)]
    pub company_name: String,
    pub appointment_date: String,
    pub appointment_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_date_1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_time_1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_date_2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_time_2: Option<String>,
}

impl AppointmentDetails {
    pub fn validate(&self) -> anyhow::Result<()> {
        for (field, value) in [
            ("client_name", &self.client_name),
            ("appointment_date", &self.appointment_date),
            ("appointment_time", &self.appointment_time),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow::anyhow!("{field} is required"));
            }
        }
        Ok(())
    }

    pub fn with_default_company(mut self, default: &str) -> Self {
        if self.company_name.trim().is_empty() {
            self.company_name = default.to_string();
        }
        self
    }

    pub fn first_name(&self) -> &str {
        let first = self.client_first.trim();
        if !first.is_empty() {
            return first;
        }
        self.client_name
            .split_whitespace()
            .next()
            .unwrap_or(self.client_name.as_str())
    }

    pub fn alternatives(&self) -> Vec<String> {
        [
            (&self.alt_date_1, &self.alt_time_1),
            (&self.alt_date_2, &self.alt_time_2),
        ]
        .into_iter()
        .filter_map(|(date, time)| {
            let date = date.as_deref().map(str::trim).filter(|d| !d.is_empty())?;
            match time.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
                Some(time) => Some(format!("{date} at {time}")),
                None => Some(date.to_string()),
            }
        })
        .collect()
    }
}
