use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

/// API key and client address checks; `/health` stays open
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if req.method() == Method::OPTIONS || req.uri().path() == "/health" {
        return Ok(next.run(req).await);
    }

    let server = &state.config.server;

    if let Some(expected) = server.api_key.as_deref().filter(|key| !key.is_empty()) {
        let provided = req.headers().get("x-api-key").and_then(|v| v.to_str().ok());
        if provided != Some(expected) {
            warn!(uri = %req.uri(), "Rejected request with invalid API key");
            return Err(ApiError::Unauthorized);
        }
    }

    if !server.allowed_ips.is_empty() {
        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        let ip = client_ip(req.headers(), peer);
        if !server.allowed_ips.iter().any(|entry| ip_allowed(&ip, entry)) {
            warn!(client_ip = %ip, "Rejected request from address outside allow-list");
            return Err(ApiError::Forbidden(ip));
        }
    }

    Ok(next.run(req).await)
}

/// First `x-forwarded-for` hop, else the socket peer with IPv4-mapped IPv6 unwrapped
pub fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(first) = forwarded {
        return first.to_string();
    }
    match peer {
        Some(IpAddr::V6(v6)) => match v6.to_ipv4_mapped() {
            Some(v4) => v4.to_string(),
            None => v6.to_string(),
        },
        Some(ip) => ip.to_string(),
        None => String::new(),
    }
}

/// `entry` is an exact address or an IPv4 CIDR block such as `192.168.1.0/24`
pub fn ip_allowed(ip: &str, entry: &str) -> bool {
    let entry = entry.trim();
    let Some((network, bits)) = entry.split_once('/') else {
        return ip == entry;
    };
    let (Ok(ip), Ok(network), Ok(bits)) = (
        ip.parse::<Ipv4Addr>(),
        network.parse::<Ipv4Addr>(),
        bits.parse::<u32>(),
    ) else {
        return false;
    };
    if bits > 32 {
        return false;
    }
    let mask = u32::MAX.checked_shl(32 - bits).unwrap_or(0);
    u32::from(ip) & mask == u32::from(network) & mask
}
