use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use super::{AssertionClaims, AuthError};

/// Signs service account assertions with the key's RSA private key.
pub struct AssertionSigner {
    encoding_key: EncodingKey,
    header: Header,
}

impl AssertionSigner {
    pub fn new(private_key_pem: &str, key_id: Option<&str>) -> Result<Self, AuthError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())?;

        let mut header = Header::new(Algorithm::RS256);
        header.kid = key_id.map(str::to_string);

        Ok(Self {
            encoding_key,
            header,
        })
    }

    pub fn sign(&self, claims: &AssertionClaims) -> Result<String, AuthError> {
        Ok(encode(&self.header, claims, &self.encoding_key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::decode_header;

    const TEST_KEY: &str = include_str!("testdata/test_service_account.pem");

    fn create_test_claims() -> AssertionClaims {
        AssertionClaims::new(
            "relay@demo.iam.gserviceaccount.com",
            &["https://www.googleapis.com/auth/firebase.messaging".to_string()],
            "https://oauth2.googleapis.com/token",
        )
    }

    #[test]
    fn test_sign_produces_rs256_token_with_kid() {
        let signer = AssertionSigner::new(TEST_KEY, Some("key-1")).unwrap();
        let token = signer.sign(&create_test_claims()).unwrap();

        assert_eq!(token.split('.').count(), 3);
        let header = decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some("key-1"));
    }

    #[test]
    fn test_invalid_pem_is_rejected() {
        let result = AssertionSigner::new("not a key", None);
        assert!(matches!(result, Err(AuthError::Signing(_))));
    }
}
