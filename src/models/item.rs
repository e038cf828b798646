use serde::{Deserialize, Serialize};

const MAX_ITEM_ID_LEN: usize = 256;
const MAX_TITLE_LEN: usize = 512;
const MAX_IMAGE_URL_LEN: usize = 10_000_000;

/// Return-proof record as sent/received over the wire and stored per user.
///
/// An id is unique across the union of a user's active and trash sets;
/// it may never exist in both at once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReturnItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub timestamp: i64,
}

impl ReturnItem {
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() || self.id.len() > MAX_ITEM_ID_LEN {
            return Err(format!(
                "id length must be 1-{MAX_ITEM_ID_LEN}, got {}",
                self.id.len()
            ));
        }
        if self.title.len() > MAX_TITLE_LEN {
            return Err(format!(
                "title length must be 0-{MAX_TITLE_LEN}, got {}",
                self.title.len()
            ));
        }
        if self.timestamp <= 0 {
            return Err("timestamp must be positive".into());
        }
        if self.image_url.len() > MAX_IMAGE_URL_LEN {
            return Err(format!(
                "imageUrl length must be 0-{MAX_IMAGE_URL_LEN}, got {}",
                self.image_url.len()
            ));
        }
        Ok(())
    }
}

/// Item row as stored in the database (without email, which is a query
/// parameter). `position` carries storage order; `is_trashed` selects the
/// active or trash set.
#[derive(Debug, sqlx::FromRow)]
pub struct DbItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub timestamp: i64,
    pub is_trashed: bool,
    pub position: i64,
}

impl DbItem {
    pub fn to_return_item(&self) -> ReturnItem {
        ReturnItem {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            image_url: self.image_url.clone(),
            timestamp: self.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, timestamp: i64) -> ReturnItem {
        ReturnItem {
            id: id.into(),
            title: "Shoe".into(),
            description: "worn".into(),
            image_url: "data:image/png;base64,AAAA".into(),
            timestamp,
        }
    }

    #[test]
    fn test_valid_item() {
        assert!(item("T1", 1000).validate().is_ok());
    }

    #[test]
    fn test_empty_id_rejected() {
        assert!(item("", 1000).validate().is_err());
    }

    #[test]
    fn test_nonpositive_timestamp_rejected() {
        assert!(item("T1", 0).validate().is_err());
        assert!(item("T1", -5).validate().is_err());
    }
}
