use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored connection to one object-storage endpoint.
///
/// Serialized in camelCase so a store file looks like:
/// `{ "id":"…", "host":"play.min.io", "accessKey":"AK", "secretKey":"SK", "secure":true, "alias":"demo" }`
///
/// The PascalCase aliases accept files written by the older MinIO CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(alias = "Id")]
    id: String,
    #[serde(alias = "Host")]
    host: String,
    #[serde(alias = "AccessKey")]
    access_key: String,
    #[serde(alias = "SecretKey")]
    secret_key: String,
    #[serde(alias = "Secure")]
    secure: bool,
    #[serde(alias = "Alias")]
    alias: String,
}

/// Operator input for a new profile; everything except the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileForm {
    pub host: String,
    pub access_key: String,
    pub secret_key: String,
    pub secure: bool,
    pub alias: String,
}

impl Profile {
    /// Builds a profile with a freshly generated id.
    pub fn create(form: ProfileForm) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), form)
    }

    pub fn with_id(id: impl Into<String>, form: ProfileForm) -> Self {
        Self {
            id: id.into(),
            host: form.host,
            access_key: form.access_key,
            secret_key: form.secret_key,
            secure: form.secure,
            alias: form.alias,
        }
    }

    /// Returns the unique identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn secure(&self) -> bool {
        self.secure
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// `alias (host)`, used wherever a profile has to be picked by a human.
    pub fn label(&self) -> String {
        format!("{} ({})", self.alias, self.host)
    }
}
