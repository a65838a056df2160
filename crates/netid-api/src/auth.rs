use secrecy::SecretString;

/// Username/password pair presented to the lookup API via HTTP Basic auth.
///
/// The password never appears in `Debug` output.
#[derive(Debug, Clone)]
pub struct ApiCredential {
    pub username: String,
    pub password: SecretString,
}

impl ApiCredential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}
