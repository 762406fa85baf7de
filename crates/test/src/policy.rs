use verdite_va::policy::{DomainPolicy, PolicyError};

/// Accepts any plausible LDH hostname, with an optional single blocked name
/// for exercising redirect-policy rejections.
#[derive(Clone, Debug, Default)]
pub struct PermissivePolicy {
    blocked: Option<String>,
}

impl PermissivePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocking(name: &str) -> Self {
        Self {
            blocked: Some(name.to_string()),
        }
    }
}

impl DomainPolicy for PermissivePolicy {
    fn valid_domain(&self, name: &str) -> Result<(), PolicyError> {
        if name.is_empty() {
            return Err(PolicyError::new("empty domain name"));
        }
        if let Some(blocked) = &self.blocked {
            if name == blocked {
                return Err(PolicyError::new(format!("{name} is on the block list")));
            }
        }
        let ldh = name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '*');
        if !ldh {
            return Err(PolicyError::new(format!("{name} is not an LDH name")));
        }
        Ok(())
    }
}
