//! Credential provisioning
//!
//! Generates random secrets for the services that sit next to the catalog
//! and writes them to a `KEY=value` settings file. The catalog itself never
//! reads these values.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use chrono::Local;
use rand::rngs::OsRng;
use rand::Rng;
use serde::Serialize;

use crate::{Error, Result};

/// Characters secrets are drawn from
pub const SECRET_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+[]{}|;:,.<>?";

const PASSWORD_LENGTH: usize = 24;
const KEY_LENGTH: usize = 32;

/// Generate a random string of `len` characters from [`SECRET_ALPHABET`]
pub fn generate_secret(len: usize) -> String {
    let mut rng = OsRng;
    (0..len)
        .map(|_| SECRET_ALPHABET[rng.gen_range(0..SECRET_ALPHABET.len())] as char)
        .collect()
}

/// How a setting's value is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretValue {
    /// Random string of the given length
    Random(usize),
    /// Literal value
    Fixed(&'static str),
}

/// A named group of settings written together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretProfile {
    /// Database credentials and service keys; recreates the file
    Base,
    /// Equipment and flight-control keys; appended
    Autonomy,
    /// Edge AI, robotics and simulation keys; appended
    Expansion,
}

impl SecretProfile {
    pub const ALL: [SecretProfile; 3] = [Self::Base, Self::Autonomy, Self::Expansion];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Autonomy => "autonomy",
            Self::Expansion => "expansion",
        }
    }

    /// Settings produced by this profile, in file order
    pub fn entries(&self) -> &'static [(&'static str, SecretValue)] {
        use SecretValue::*;
        match self {
            Self::Base => &[
                ("DB_PASSWORD", Random(PASSWORD_LENGTH)),
                ("API_KEY", Random(KEY_LENGTH)),
                ("SECRET_KEY", Random(KEY_LENGTH)),
                ("JWT_SECRET", Random(KEY_LENGTH)),
                ("ENCRYPTION_KEY", Random(KEY_LENGTH)),
                ("DB_USERNAME", Fixed("ml_analyst")),
                ("DB_NAME", Fixed("ml_technologies.db")),
                ("DB_HOST", Fixed("localhost")),
                ("DB_PORT", Fixed("5432")),
            ],
            Self::Autonomy => &[
                ("EQUIPMENT_DB_PASSWORD", Random(PASSWORD_LENGTH)),
                ("FLIGHT_CONTROL_API_KEY", Random(KEY_LENGTH)),
                ("SENSOR_DATA_SECRET", Random(KEY_LENGTH)),
                ("AUTOPILOT_ENCRYPTION_KEY", Random(KEY_LENGTH)),
                ("DRONE_COMMUNICATION_KEY", Random(KEY_LENGTH)),
            ],
            Self::Expansion => &[
                ("AI_HARDWARE_PASSWORD", Random(PASSWORD_LENGTH)),
                ("EDGE_AI_API_KEY", Random(KEY_LENGTH)),
                ("ROBOTICS_SECRET", Random(KEY_LENGTH)),
                ("SIMULATION_ENCRYPTION_KEY", Random(KEY_LENGTH)),
                ("AUTONOMOUS_SYSTEMS_KEY", Random(KEY_LENGTH)),
            ],
        }
    }

    /// Whether provisioning truncates the settings file instead of appending
    pub fn recreates_file(&self) -> bool {
        matches!(self, Self::Base)
    }

    fn header(&self, timestamp: &str) -> String {
        match self {
            Self::Base => format!(
                "# ML Technologies Database Environment Variables\n\
                 # Generated on: {}\n\
                 # WARNING: Keep this file secure and never commit to version control\n\n",
                timestamp
            ),
            Self::Autonomy => format!(
                "\n# Additional passwords for equipment and flight control systems\n\
                 # Updated on: {}\n",
                timestamp
            ),
            Self::Expansion => format!(
                "\n# Additional passwords for expanded AI and autonomous systems\n\
                 # Updated on: {}\n",
                timestamp
            ),
        }
    }
}

impl fmt::Display for SecretProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecretProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| Error::InvalidValue(format!("Unknown secret profile: {}", s)))
    }
}

/// One generated setting
#[derive(Debug, Clone, Serialize)]
pub struct Secret {
    pub key: &'static str,
    pub value: String,
}

/// Generate the profile's values without writing anything
pub fn generate(profile: SecretProfile) -> Vec<Secret> {
    profile
        .entries()
        .iter()
        .map(|&(key, value)| Secret {
            key,
            value: match value {
                SecretValue::Random(len) => generate_secret(len),
                SecretValue::Fixed(v) => v.to_string(),
            },
        })
        .collect()
}

/// Generate a profile and write it to `path`.
///
/// `base` recreates the file; the other profiles append a block, creating
/// the file when it does not exist yet.
pub fn provision(path: &Path, profile: SecretProfile) -> Result<Vec<Secret>> {
    let secrets = generate(profile);
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let mut options = OpenOptions::new();
    if profile.recreates_file() {
        options.write(true).create(true).truncate(true);
    } else {
        options.append(true).create(true);
    }
    let mut file = options.open(path)?;

    let mut block = profile.header(&timestamp);
    for secret in &secrets {
        block.push_str(&format!("{}={}\n", secret.key, secret.value));
    }
    file.write_all(block.as_bytes())?;

    tracing::info!(
        "Wrote {} '{}' settings to {}",
        secrets.len(),
        profile,
        path.display()
    );
    Ok(secrets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generate_secret_uses_alphabet() {
        let secret = generate_secret(64);
        assert_eq!(secret.chars().count(), 64);
        assert!(secret.bytes().all(|b| SECRET_ALPHABET.contains(&b)));
        assert_ne!(generate_secret(32), generate_secret(32));
    }

    #[test]
    fn test_profile_lengths() {
        let base = generate(SecretProfile::Base);
        assert_eq!(base.len(), 9);
        assert_eq!(base[0].key, "DB_PASSWORD");
        assert_eq!(base[0].value.len(), 24);
        assert_eq!(base[1].value.len(), 32);
        let port = base.iter().find(|s| s.key == "DB_PORT").unwrap();
        assert_eq!(port.value, "5432");
    }

    #[test]
    fn test_base_recreates_and_others_append() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("env.main");
        std::fs::write(&path, "STALE=1\n").unwrap();

        provision(&path, SecretProfile::Base).unwrap();
        provision(&path, SecretProfile::Autonomy).unwrap();
        provision(&path, SecretProfile::Expansion).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("STALE=1"));
        assert!(contents.starts_with("# ML Technologies Database Environment Variables"));
        assert!(contents.contains("DB_USERNAME=ml_analyst\n"));
        assert!(contents.contains("# Additional passwords for equipment and flight control systems"));
        assert!(contents.contains("\nDRONE_COMMUNICATION_KEY="));
        assert!(contents.contains("\nAUTONOMOUS_SYSTEMS_KEY="));

        let settings = contents
            .lines()
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .count();
        assert_eq!(settings, 19);
    }

    #[test]
    fn test_append_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("env.main");

        provision(&path, SecretProfile::Autonomy).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_profile_parse() {
        assert_eq!("expansion".parse::<SecretProfile>().unwrap(), SecretProfile::Expansion);
        assert!("prod".parse::<SecretProfile>().is_err());
    }
}
