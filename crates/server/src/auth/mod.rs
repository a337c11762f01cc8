pub mod config;
pub mod identity;
pub mod middleware;
pub mod password;

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use self::config::AuthFileConfig;
use self::identity::OwnerIdentity;
use self::password::verify_password;

/// Central auth provider built once at startup from `auth.toml`.
pub struct AuthProvider {
    /// Username to argon2 hash lookup table.
    users: HashMap<String, String>,
}

impl AuthProvider {
    /// Build the provider, rejecting duplicate or blank user names.
    pub fn new(config: &AuthFileConfig) -> Result<Self, String> {
        let mut users = HashMap::new();
        for u in &config.users {
            if u.username.trim().is_empty() {
                return Err("user with empty username in auth config".to_owned());
            }
            if users
                .insert(u.username.clone(), u.password_hash.clone())
                .is_some()
            {
                return Err(format!("duplicate user '{}' in auth config", u.username));
            }
        }
        Ok(Self { users })
    }

    /// Number of configured users.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Check a username/password pair.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<OwnerIdentity> {
        let hash = self.users.get(username)?;
        verify_password(hash, password).then(|| OwnerIdentity::new(username))
    }

    /// Authenticate a raw `Authorization` header value.
    pub fn authenticate_header(&self, header: &str) -> Result<OwnerIdentity, &'static str> {
        let (username, password) = parse_basic(header)?;
        self.authenticate(&username, &password)
            .ok_or("invalid credentials")
    }
}

/// Split `Basic <base64(user:pass)>` into its parts.
fn parse_basic(header: &str) -> Result<(String, String), &'static str> {
    let (scheme, encoded) = header
        .trim()
        .split_once(' ')
        .ok_or("malformed authorization header")?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err("unsupported authorization scheme");
    }
    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| "malformed basic credentials")?;
    let decoded = String::from_utf8(decoded).map_err(|_| "malformed basic credentials")?;
    let (username, password) = decoded
        .split_once(':')
        .ok_or("malformed basic credentials")?;
    Ok((username.to_owned(), password.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::config::UserConfig;
    use super::password::hash_password;
    use super::*;

    fn provider() -> AuthProvider {
        AuthProvider::new(&AuthFileConfig {
            users: vec![UserConfig {
                username: "user1@email.com".to_owned(),
                password_hash: hash_password("password1").unwrap(),
            }],
        })
        .unwrap()
    }

    fn basic(user: &str, pass: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{user}:{pass}")))
    }

    #[test]
    fn valid_credentials_yield_hashed_owner() {
        let identity = provider()
            .authenticate_header(&basic("user1@email.com", "password1"))
            .unwrap();
        assert_eq!(identity.username, "user1@email.com");
        assert_eq!(identity.owner_id, fragments_core::hash_owner("user1@email.com"));
    }

    #[test]
    fn wrong_password_is_rejected() {
        assert_eq!(
            provider().authenticate_header(&basic("user1@email.com", "nope")),
            Err("invalid credentials")
        );
    }

    #[test]
    fn unknown_user_is_rejected() {
        assert!(provider()
            .authenticate_header(&basic("ghost@email.com", "password1"))
            .is_err());
    }

    #[test]
    fn non_basic_schemes_are_rejected() {
        assert_eq!(
            provider().authenticate_header("Bearer abc"),
            Err("unsupported authorization scheme")
        );
        assert_eq!(
            provider().authenticate_header("Basic !!!"),
            Err("malformed basic credentials")
        );
        assert_eq!(
            provider().authenticate_header("Basic"),
            Err("malformed authorization header")
        );
    }

    #[test]
    fn password_may_contain_colons() {
        let (user, pass) = parse_basic(&basic("a@b.c", "x:y:z")).unwrap();
        assert_eq!(user, "a@b.c");
        assert_eq!(pass, "x:y:z");
    }

    #[test]
    fn duplicate_users_are_rejected() {
        let user = || UserConfig {
            username: "dup".to_owned(),
            password_hash: "h".to_owned(),
        };
        let err = AuthProvider::new(&AuthFileConfig {
            users: vec![user(), user()],
        });
        assert!(err.is_err());
    }

    #[test]
    fn parses_auth_file() {
        let config = AuthFileConfig::from_toml(
            r#"
            [[users]]
            username = "user1@email.com"
            password_hash = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQxMjM0$abc"
            "#,
        )
        .unwrap();
        assert_eq!(config.users.len(), 1);
        assert_eq!(AuthProvider::new(&config).unwrap().user_count(), 1);
    }
}
