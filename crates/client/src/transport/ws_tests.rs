// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn build_request_applies_headers() -> anyhow::Result<()> {
    let headers = vec![("Authorization".to_owned(), "Bearer tok".to_owned())];
    let request = build_request("ws://127.0.0.1:1/ws", &headers)?;
    assert_eq!(
        request.headers().get("Authorization").map(|v| v.to_str().unwrap_or_default()),
        Some("Bearer tok")
    );
    Ok(())
}
