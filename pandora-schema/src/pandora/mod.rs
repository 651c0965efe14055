mod oauth;
mod token;

pub use oauth::{ClaudeOauthRequest, ClaudeOauthResponse, OauthTokenRequest, OauthTokenResponse};
pub use token::{
    RefreshTokenForm, RefreshTokenResponse, TokenInfoResponse, TokenRegisterForm,
    TokenRegisterResponse,
};
