//! Turns an issue image reference (data URI or http(s) URL) into packed RGB.

use std::io::Cursor;
use std::net::IpAddr;

use anyhow::{anyhow, bail, Context};
use base64::Engine;
use image::{ImageReader, Limits};
use mj_core::export::PreparedImage;
use reqwest::{Client, Url};

/// Longest edge, in pixels, an embedded image is downscaled to.
pub const MAX_EDGE_PX: u32 = 1200;

/// Largest remote image body accepted, matching the API's JSON body limit.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Decoder ceilings applied before any pixel buffer is allocated.
pub fn decode_limits() -> Limits {
    let mut limits = Limits::default();
    limits.max_image_width = Some(8192);
    limits.max_image_height = Some(8192);
    limits.max_alloc = Some(256 * 1024 * 1024);
    limits
}

/// Payload of a `data:[<mime>][;base64],<data>` URI.
pub fn decode_data_uri(uri: &str) -> anyhow::Result<Vec<u8>> {
    let rest = uri.strip_prefix("data:").ok_or_else(|| anyhow!("not a data URI"))?;
    let (meta, payload) = rest.split_once(',').ok_or_else(|| anyhow!("data URI without payload"))?;
    if !meta.split(';').any(|p| p.eq_ignore_ascii_case("base64")) {
        bail!("only base64 data URIs are supported");
    }
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD.decode(compact).context("Invalid base64 in data URI")
}

/// Addresses a remote image may live on: nothing loopback, private,
/// link-local, shared, multicast or unspecified.
pub fn is_public(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, ..] = v4.octets();
            !(v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
                || v4.is_multicast()
                || v4.is_documentation()
                || a == 0
                || (a == 100 && (64..128).contains(&b)))
        }
        IpAddr::V6(v6) => {
            if let Some(v4) = v6.to_ipv4_mapped() {
                return is_public(IpAddr::V4(v4));
            }
            let first = v6.segments()[0];
            !(v6.is_loopback()
                || v6.is_unspecified()
                || v6.is_multicast()
                || first & 0xfe00 == 0xfc00
                || first & 0xffc0 == 0xfe80)
        }
    }
}

/// Resolves the URL's host and refuses it unless every address is public.
async fn check_destination(url: &Url) -> anyhow::Result<()> {
    let host = url.host_str().ok_or_else(|| anyhow!("image URL has no host"))?;
    let port = url.port_or_known_default().ok_or_else(|| anyhow!("image URL has no port"))?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let addrs: Vec<_> = tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("Cannot resolve image host {host}"))?
        .collect();
    if addrs.is_empty() || addrs.iter().any(|a| !is_public(a.ip())) {
        bail!("image host {host} is not allowed");
    }
    Ok(())
}

fn append_capped(buf: &mut Vec<u8>, chunk: &[u8], max: usize) -> anyhow::Result<()> {
    if buf.len() + chunk.len() > max {
        bail!("image exceeds {max} bytes");
    }
    buf.extend_from_slice(chunk);
    Ok(())
}

/// Downloads a public http(s) image, reading at most [`MAX_IMAGE_BYTES`].
/// Only the first hop is checked; the client must not follow redirects.
pub async fn fetch(client: &Client, url: &str) -> anyhow::Result<Vec<u8>> {
    let url = Url::parse(url).context("Invalid image URL")?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("unsupported image URL scheme");
    }
    check_destination(&url).await?;

    let mut response = client.get(url).send().await?.error_for_status()?;
    if response.content_length().is_some_and(|len| len > MAX_IMAGE_BYTES as u64) {
        bail!("image exceeds {MAX_IMAGE_BYTES} bytes");
    }
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        append_capped(&mut body, &chunk, MAX_IMAGE_BYTES)?;
    }
    Ok(body)
}

/// Decodes any format the `image` crate was built with, downscaling so the
/// longest edge is at most [`MAX_EDGE_PX`]. CPU bound; callers on the async
/// runtime should move it to a blocking thread.
pub fn prepare(bytes: &[u8]) -> anyhow::Result<PreparedImage> {
    prepare_with(bytes, decode_limits())
}

fn prepare_with(bytes: &[u8], limits: Limits) -> anyhow::Result<PreparedImage> {
    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .context("Unsupported or corrupt image")?;
    reader.limits(limits);
    let mut img = reader.decode().context("Unsupported or corrupt image")?;
    if img.width() > MAX_EDGE_PX || img.height() > MAX_EDGE_PX {
        img = img.thumbnail(MAX_EDGE_PX, MAX_EDGE_PX);
    }
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(PreparedImage { width, height, rgb: rgb.into_raw() })
}
