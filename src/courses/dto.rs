use serde::{de, Deserialize, Deserializer, Serialize};

use crate::courses::repo_types::{Course, CourseFields};

/// Body of create and update requests.
#[derive(Debug, Deserialize)]
pub struct CourseRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "price_from_number_or_text")]
    pub price: Option<f64>,
    #[serde(default)]
    pub image: String,
}

impl CourseRequest {
    /// Presence check only; `None` when any field is missing or blank.
    pub fn into_fields(self) -> Option<CourseFields> {
        let title = self.title.trim().to_string();
        if title.is_empty() || self.description.trim().is_empty() || self.image.trim().is_empty()
        {
            return None;
        }
        Some(CourseFields {
            title,
            description: self.description,
            price: self.price?,
            image: self.image,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Number(f64),
    Text(String),
}

/// Accepts `49.5` and `"49.5"`. A blank string counts as absent.
fn price_from_number_or_text<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawPrice>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawPrice::Number(n)) => Ok(Some(n)),
        Some(RawPrice::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(RawPrice::Text(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("price `{s}` is not a number"))),
    }
}

#[derive(Debug, Serialize)]
pub struct CourseListResponse {
    pub message: String,
    pub courses: Vec<Course>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> CourseRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn complete_request_becomes_fields() {
        let fields = request(
            r#"{"title":" Rust 101 ","description":"intro","price":49.5,"image":"rust.png"}"#,
        )
        .into_fields()
        .unwrap();
        assert_eq!(fields.title, "Rust 101");
        assert_eq!(fields.price, 49.5);
    }

    #[test]
    fn missing_price_or_blank_field_is_rejected() {
        assert!(request(r#"{"title":"a","description":"b","image":"c"}"#)
            .into_fields()
            .is_none());
        assert!(request(r#"{"title":"  ","description":"b","price":1,"image":"c"}"#)
            .into_fields()
            .is_none());
    }

    #[test]
    fn zero_price_is_present() {
        let fields = request(r#"{"title":"free","description":"b","price":0,"image":"c"}"#)
            .into_fields();
        assert_eq!(fields.map(|f| f.price), Some(0.0));
    }

    #[test]
    fn numeric_string_price_is_accepted() {
        let fields = request(r#"{"title":"t","description":"d","price":" 49 ","image":"i"}"#)
            .into_fields()
            .unwrap();
        assert_eq!(fields.price, 49.0);
        assert!(request(r#"{"title":"t","description":"d","price":"","image":"i"}"#)
            .into_fields()
            .is_none());
    }

    #[test]
    fn non_numeric_price_fails_to_deserialize() {
        for body in [
            r#"{"title":"t","price":"forty"}"#,
            r#"{"title":"t","price":true}"#,
            r#"{"title":"t","price":"NaN"}"#,
        ] {
            assert!(serde_json::from_str::<CourseRequest>(body).is_err(), "{body}");
        }
    }
}
