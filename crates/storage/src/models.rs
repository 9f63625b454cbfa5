use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct PostgrestError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl PostgrestError {
    pub fn summary(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        for part in [&self.message, &self.details, &self.hint].into_iter().flatten() {
            if !part.is_empty() {
                parts.push(part);
            }
        }
        if parts.is_empty() {
            "no error message".to_string()
        } else {
            parts.join(" / ")
        }
    }
}
