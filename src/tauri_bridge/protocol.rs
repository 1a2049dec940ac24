//! Custom protocol handlers for efficient data transfer
//!
//! This module implements the `frame://` custom protocol for direct binary
//! transfer of render frames, bypassing Tauri's IPC JSON serialization.

use image::{codecs::jpeg::JpegEncoder, ImageBuffer, ImageEncoder, Rgba};
use tauri::http::Response as HttpResponse;
use tracing::{debug, warn};

use crate::bridge::surface::{Frame, FrameView};
use crate::config::compression::JPEG_QUALITY;

type Response = HttpResponse<Vec<u8>>;

/// Handle requests to the custom `frame://` protocol
///
/// Supported endpoints:
/// - `frame` or `frame.jpg`: JPEG-compressed frame
/// - `frame.raw`: Raw RGBA frame
pub fn handle_frame_protocol(uri_path: &str, frames: Option<&FrameView>) -> Response {
    let resource = uri_path.trim_start_matches('/');
    debug!("[Protocol] Resolved resource: {}", resource);

    let encode: fn(&Frame) -> Result<Response, String> = match resource {
        "frame" | "frame.jpg" => jpeg_frame,
        "frame.raw" => raw_frame,
        _ => return plain(404, "Not Found"),
    };

    let Some(frames) = frames else {
        return plain(503, "Frame not ready");
    };
    match frames.with_latest(encode) {
        Some(Ok(response)) => response,
        Some(Err(e)) => {
            warn!("[Protocol] Failed to encode frame: {}", e);
            plain(500, "Frame encoding failed")
        }
        None => plain(503, "Frame not ready"),
    }
}

/// Compress the frame to JPEG
fn jpeg_frame(frame: &Frame) -> Result<Response, String> {
    let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_raw(frame.width, frame.height, frame.rgba.clone())
            .ok_or("frame size does not match pixel data")?;

    // Convert RGBA to RGB for JPEG (no alpha channel)
    let rgb_img = image::DynamicImage::ImageRgba8(img).to_rgb8();

    let mut jpeg_data = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg_data, JPEG_QUALITY)
        .write_image(
            rgb_img.as_raw(),
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| e.to_string())?;

    frame_response(frame, "image/jpeg", jpeg_data)
}

fn raw_frame(frame: &Frame) -> Result<Response, String> {
    frame_response(frame, "application/octet-stream", frame.rgba.clone())
}

fn frame_response(frame: &Frame, content_type: &str, body: Vec<u8>) -> Result<Response, String> {
    HttpResponse::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("X-Frame-Width", frame.width.to_string())
        .header("X-Frame-Height", frame.height.to_string())
        .header("Access-Control-Allow-Origin", "*")
        .header(
            "Access-Control-Expose-Headers",
            "X-Frame-Width, X-Frame-Height",
        )
        .body(body)
        .map_err(|e| e.to_string())
}

fn plain(status: u16, text: &str) -> Response {
    let mut response = HttpResponse::new(text.as_bytes().to_vec());
    *response.status_mut() = tauri::http::StatusCode::from_u16(status)
        .unwrap_or(tauri::http::StatusCode::INTERNAL_SERVER_ERROR);
    response
        .headers_mut()
        .insert("Content-Type", tauri::http::HeaderValue::from_static("text/plain"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::surface::{CanvasElement, HostElement};

    #[test]
    fn unknown_resource_is_not_found() {
        assert_eq!(handle_frame_protocol("/stats", None).status(), 404);
    }

    #[test]
    fn missing_frame_is_unavailable() {
        let canvas = CanvasElement::new(2, 2, 1.0);
        let view = canvas.frame_view();
        assert_eq!(handle_frame_protocol("/frame", Some(&view)).status(), 503);
        assert_eq!(handle_frame_protocol("/frame.raw", None).status(), 503);
    }

    #[test]
    fn frames_are_served_at_their_own_size() {
        let canvas = CanvasElement::new(3, 2, 1.0);
        let view = canvas.frame_view();
        let handle = canvas.transfer_control_to_offscreen().unwrap();
        handle.present(Frame {
            width: 3,
            height: 2,
            rgba: vec![128; 24],
        });

        let raw = handle_frame_protocol("/frame.raw", Some(&view));
        assert_eq!(raw.status(), 200);
        assert_eq!(raw.body().len(), 24);
        assert_eq!(raw.headers()["X-Frame-Width"], "3");

        let jpeg = handle_frame_protocol("frame.jpg", Some(&view));
        assert_eq!(jpeg.status(), 200);
        assert_eq!(jpeg.headers()["Content-Type"], "image/jpeg");
    }
}
