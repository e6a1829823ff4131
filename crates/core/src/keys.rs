use std::fmt;

/// The closed set of property key names recognized in the account store.
///
/// Only a strict subset is writable through this crate; the remaining keys
/// are loaded for inspection but rejected on every write path. Strings that
/// match none of these variants are invalid everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyKey {
    // Writable
    AllowsInsecureAuthentication,
    DisableDynamicConfiguration,
    Hostname,
    PortNumber,
    ServerPath,
    // Recognized but read-only
    AuthenticationScheme,
    SslEnabled,
    FullName,
    AllowsRecoverableTrustCertificate,
    EmailAliases,
    IdentityEmailAddress,
    SecIdentityPersistentRef,
    SendingAccountIdentifier,
}

impl PropertyKey {
    /// Parse a key string from the store. Returns `None` for strings outside
    /// the recognized set.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "AllowsInsecureAuthentication" => Some(Self::AllowsInsecureAuthentication),
            "DisableDynamicConfiguration" => Some(Self::DisableDynamicConfiguration),
            "Hostname" => Some(Self::Hostname),
            "PortNumber" => Some(Self::PortNumber),
            "ServerPath" => Some(Self::ServerPath),
            "AuthenticationScheme" => Some(Self::AuthenticationScheme),
            "SSLEnabled" => Some(Self::SslEnabled),
            "ACPropertyFullName" => Some(Self::FullName),
            "AllowsRecoverableTrustCertificate" => Some(Self::AllowsRecoverableTrustCertificate),
            "EmailAliases" => Some(Self::EmailAliases),
            "IdentityEmailAddress" => Some(Self::IdentityEmailAddress),
            "SecIdentityPersistentRef" => Some(Self::SecIdentityPersistentRef),
            "SendingAccountIdentifier" => Some(Self::SendingAccountIdentifier),
            _ => None,
        }
    }

    /// The exact string form stored in the `ZKEY` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllowsInsecureAuthentication => "AllowsInsecureAuthentication",
            Self::DisableDynamicConfiguration => "DisableDynamicConfiguration",
            Self::Hostname => "Hostname",
            Self::PortNumber => "PortNumber",
            Self::ServerPath => "ServerPath",
            Self::AuthenticationScheme => "AuthenticationScheme",
            Self::SslEnabled => "SSLEnabled",
            Self::FullName => "ACPropertyFullName",
            Self::AllowsRecoverableTrustCertificate => "AllowsRecoverableTrustCertificate",
            Self::EmailAliases => "EmailAliases",
            Self::IdentityEmailAddress => "IdentityEmailAddress",
            Self::SecIdentityPersistentRef => "SecIdentityPersistentRef",
            Self::SendingAccountIdentifier => "SendingAccountIdentifier",
        }
    }

    /// Whether this crate is allowed to create or update the key.
    pub fn is_writable(&self) -> bool {
        matches!(
            self,
            Self::AllowsInsecureAuthentication
                | Self::DisableDynamicConfiguration
                | Self::Hostname
                | Self::PortNumber
                | Self::ServerPath
        )
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [PropertyKey; 13] = [
        PropertyKey::AllowsInsecureAuthentication,
        PropertyKey::DisableDynamicConfiguration,
        PropertyKey::Hostname,
        PropertyKey::PortNumber,
        PropertyKey::ServerPath,
        PropertyKey::AuthenticationScheme,
        PropertyKey::SslEnabled,
        PropertyKey::FullName,
        PropertyKey::AllowsRecoverableTrustCertificate,
        PropertyKey::EmailAliases,
        PropertyKey::IdentityEmailAddress,
        PropertyKey::SecIdentityPersistentRef,
        PropertyKey::SendingAccountIdentifier,
    ];

    #[test]
    fn parse_roundtrips_every_key() {
        for key in ALL {
            assert_eq!(PropertyKey::parse(key.as_str()), Some(key));
        }
    }

    #[test]
    fn parse_rejects_unknown_strings() {
        assert_eq!(PropertyKey::parse("NotARealKey"), None);
        assert_eq!(PropertyKey::parse(""), None);
        // Case matters: the store writes exact strings
        assert_eq!(PropertyKey::parse("hostname"), None);
    }

    #[test]
    fn only_the_five_supported_keys_are_writable() {
        let writable: Vec<_> = ALL.iter().filter(|k| k.is_writable()).collect();
        assert_eq!(
            writable,
            vec![
                &PropertyKey::AllowsInsecureAuthentication,
                &PropertyKey::DisableDynamicConfiguration,
                &PropertyKey::Hostname,
                &PropertyKey::PortNumber,
                &PropertyKey::ServerPath,
            ]
        );
    }
}
