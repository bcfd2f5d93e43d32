//! Embedded placeholder video for the PiP player.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::HostError;

/// A one-second black H.264 MP4, base64 encoded.
const PIP_VIDEO_BASE64: &str = include_str!("../../../assets/pip_video.mp4.b64");

pub fn decode_pip_video() -> Result<Vec<u8>, HostError> {
    STANDARD
        .decode(PIP_VIDEO_BASE64.trim())
        .map_err(|err| HostError::call("base64 decode", err))
}

/// Decode the video into `dir/file_name`, overwriting any previous copy.
pub fn write_pip_video(dir: &Path, file_name: &str) -> Result<PathBuf, HostError> {
    let bytes = decode_pip_video()?;
    let path = dir.join(file_name);
    fs::write(&path, &bytes)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "[PiP] video written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_video_is_mp4() {
        let bytes = decode_pip_video().unwrap();
        assert_eq!(&bytes[4..8], b"ftyp");
    }

    #[test]
    fn test_write_pip_video() {
        let dir = std::env::temp_dir().join(format!("floating_lyric_asset_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let path = write_pip_video(&dir, "pip_video.mp4").unwrap();
        assert_eq!(fs::read(&path).unwrap(), decode_pip_video().unwrap());

        fs::remove_dir_all(&dir).unwrap();
    }
}
