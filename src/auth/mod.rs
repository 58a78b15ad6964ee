use std::collections::HashMap;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role required on every `/cashcards` endpoint.
pub const CARD_OWNER_ROLE: &str = "card-owner";

// Well-formed salt and digest that no password hashes to.
const DUMMY_SALT_AND_DIGEST: &str = "cashcardsdummysaltvaludummyHashThatNeverMatchesAnyone";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingCredentials,

    #[error("Authorization header must use the Basic scheme")]
    UnsupportedScheme,

    #[error("Malformed Basic credentials")]
    MalformedCredentials,

    #[error("Bad credentials")]
    BadCredentials,

    #[error("Failed to hash password: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Failed to read users file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid users file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// One entry of the user directory, as stored in a users file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// The authenticated identity attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub roles: Vec<String>,
}

impl Principal {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Username/password pair decoded from a Basic `Authorization` header.
#[derive(Debug, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl BasicCredentials {
    pub fn from_header(value: &str) -> Result<Self, AuthError> {
        let (scheme, encoded) = value
            .trim()
            .split_once(' ')
            .ok_or(AuthError::UnsupportedScheme)?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(AuthError::UnsupportedScheme);
        }

        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|_| AuthError::MalformedCredentials)?;
        let decoded = String::from_utf8(decoded).map_err(|_| AuthError::MalformedCredentials)?;

        // Passwords may contain ':'; usernames may not.
        let (username, password) = decoded
            .split_once(':')
            .ok_or(AuthError::MalformedCredentials)?;

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// Fixed set of known users, injected into the application state.
#[derive(Debug, Clone)]
pub struct UserDirectory {
    users: HashMap<String, UserRecord>,
    /// Verified against when the username is unknown, so a miss costs as much
    /// as a wrong password.
    dummy_hash: String,
}

impl UserDirectory {
    pub fn new(records: impl IntoIterator<Item = UserRecord>) -> Self {
        let users: HashMap<String, UserRecord> = records
            .into_iter()
            .map(|record| (record.username.clone(), record))
            .collect();
        let cost = users
            .values()
            .filter_map(|record| hash_cost(&record.password_hash))
            .max()
            .unwrap_or(bcrypt::DEFAULT_COST);
        Self {
            users,
            dummy_hash: dummy_hash(cost),
        }
    }

    /// Built-in test users, hashed at the given bcrypt cost.
    pub fn test_users(cost: u32) -> Result<Self, AuthError> {
        let seed = [
            ("sarah1", "abc123", CARD_OWNER_ROLE),
            ("kumar2", "xyz789", CARD_OWNER_ROLE),
            ("hank-owns-no-cards", "qrs456", "non-owner"),
        ];

        let mut records = Vec::with_capacity(seed.len());
        for (username, password, role) in seed {
            records.push(UserRecord {
                username: username.to_string(),
                password_hash: bcrypt::hash(password, cost)?,
                roles: vec![role.to_string()],
            });
        }
        Ok(Self::new(records))
    }

    /// Load records from a YAML list of `{ username, password_hash, roles }`.
    pub fn from_yaml_file(path: &Path) -> Result<Self, AuthError> {
        let contents = std::fs::read_to_string(path)?;
        let records: Vec<UserRecord> = serde_yaml::from_str(&contents)?;
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &UserRecord> {
        self.users.values()
    }

    /// Verify credentials against the directory. Unknown users and wrong
    /// passwords produce the same error.
    pub fn authenticate(&self, credentials: &BasicCredentials) -> Result<Principal, AuthError> {
        let Some(record) = self.users.get(&credentials.username) else {
            let _ = bcrypt::verify(&credentials.password, &self.dummy_hash);
            return Err(AuthError::BadCredentials);
        };

        // A corrupt stored hash is treated as a failed login.
        let valid = bcrypt::verify(&credentials.password, &record.password_hash).unwrap_or(false);
        if !valid {
            return Err(AuthError::BadCredentials);
        }

        Ok(Principal {
            username: record.username.clone(),
            roles: record.roles.clone(),
        })
    }
}

/// Cost field of a `$2b$NN$...` hash, when it is in bcrypt's valid range.
fn hash_cost(hash: &str) -> Option<u32> {
    hash.split('$')
        .nth(2)?
        .parse::<u32>()
        .ok()
        .filter(|cost| (4..=31).contains(cost))
}

fn dummy_hash(cost: u32) -> String {
    format!("$2b${:02}${}", cost, DUMMY_SALT_AND_DIGEST)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    fn header(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    #[test]
    fn parses_basic_header() {
        let creds = BasicCredentials::from_header(&header("sarah1:abc123")).unwrap();
        assert_eq!(creds.username, "sarah1");
        assert_eq!(creds.password, "abc123");

        let creds = BasicCredentials::from_header(&header("user:pa:ss")).unwrap();
        assert_eq!(creds.password, "pa:ss");
    }

    #[test]
    fn rejects_bad_headers() {
        assert!(matches!(
            BasicCredentials::from_header("Bearer abc"),
            Err(AuthError::UnsupportedScheme)
        ));
        assert!(matches!(
            BasicCredentials::from_header("Basic !!!"),
            Err(AuthError::MalformedCredentials)
        ));
        assert!(matches!(
            BasicCredentials::from_header(&header("no-colon")),
            Err(AuthError::MalformedCredentials)
        ));
    }

    #[test]
    fn authenticates_test_users() {
        let directory = UserDirectory::test_users(TEST_COST).unwrap();
        assert_eq!(directory.len(), 3);

        let sarah = directory
            .authenticate(&BasicCredentials {
                username: "sarah1".into(),
                password: "abc123".into(),
            })
            .unwrap();
        assert!(sarah.has_role(CARD_OWNER_ROLE));

        let hank = directory
            .authenticate(&BasicCredentials {
                username: "hank-owns-no-cards".into(),
                password: "qrs456".into(),
            })
            .unwrap();
        assert!(!hank.has_role(CARD_OWNER_ROLE));
    }

    #[test]
    fn wrong_password_and_unknown_user_fail_alike() {
        let directory = UserDirectory::test_users(TEST_COST).unwrap();

        let bad_password = directory.authenticate(&BasicCredentials {
            username: "sarah1".into(),
            password: "BAD-PASSWORD".into(),
        });
        let bad_user = directory.authenticate(&BasicCredentials {
            username: "BAD-USER".into(),
            password: "abc123".into(),
        });

        assert!(matches!(bad_password, Err(AuthError::BadCredentials)));
        assert!(matches!(bad_user, Err(AuthError::BadCredentials)));
    }

    #[test]
    fn unknown_users_pay_for_a_bcrypt_verification() {
        let directory = UserDirectory::test_users(TEST_COST).unwrap();
        assert_eq!(directory.dummy_hash, dummy_hash(TEST_COST));

        // Must be well-formed, or verify would bail out before hashing
        assert_eq!(bcrypt::verify("abc123", &directory.dummy_hash).ok(), Some(false));
    }

    #[test]
    fn dummy_cost_follows_stored_hashes() {
        assert_eq!(hash_cost(&dummy_hash(10)), Some(10));
        assert_eq!(hash_cost("not-a-hash"), None);
        assert_eq!(
            UserDirectory::new(Vec::new()).dummy_hash,
            dummy_hash(bcrypt::DEFAULT_COST)
        );
    }

    #[test]
    fn loads_users_from_yaml() {
        let hash = bcrypt::hash("s3cret", TEST_COST).unwrap();
        let yaml = format!(
            "- username: alice\n  password_hash: \"{}\"\n  roles: [card-owner]\n- username: bob\n  password_hash: \"{}\"\n",
            hash, hash
        );
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, yaml.as_bytes()).unwrap();

        let directory = UserDirectory::from_yaml_file(file.path()).unwrap();
        assert_eq!(directory.len(), 2);

        let bob = directory
            .authenticate(&BasicCredentials {
                username: "bob".into(),
                password: "s3cret".into(),
            })
            .unwrap();
        assert!(bob.roles.is_empty());
    }
}
