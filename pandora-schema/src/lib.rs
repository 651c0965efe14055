pub mod oneapi;
pub mod pandora;

pub use oneapi::{OneApiChannel, OneApiEnvelope};
pub use pandora::{
    ClaudeOauthRequest, ClaudeOauthResponse, OauthTokenRequest, OauthTokenResponse,
    RefreshTokenForm, RefreshTokenResponse, TokenInfoResponse, TokenRegisterForm,
    TokenRegisterResponse,
};
