use crate::error::InstallError;
use flate2::read::GzDecoder;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tar::Archive;

/// Stream `url` into `local_path`, drawing a progress bar on stderr.
/// Single attempt; any transport failure is returned as is.
pub async fn download_file(
    client: &reqwest::Client,
    url: &str,
    local_path: &Path,
) -> Result<(), InstallError> {
    let filename = local_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| url.to_string());
    tracing::info!("Downloading {}...", filename);

    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(InstallError::HttpStatus {
            url: url.to_string(),
            status: response.status(),
        });
    }

    let pb = match response.content_length() {
        Some(total) if total > 0 => {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{msg} {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        }
        _ => ProgressBar::new_spinner(),
    };
    pb.set_message(format!("Downloading {}", filename));

    let mut file = fs::File::create(local_path)?;
    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }
    file.flush()?;

    pb.finish_and_clear();
    tracing::debug!("Wrote {} bytes to {}", downloaded, local_path.display());
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
    TarXz,
}

/// `ustar` magic lives at this offset in the first tar header.
const USTAR_OFFSET: usize = 257;

impl ArchiveFormat {
    /// Guess from the file name first, then from the leading magic bytes.
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if name.ends_with(".zip") {
            return Some(ArchiveFormat::Zip);
        }
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            return Some(ArchiveFormat::TarGz);
        }
        if name.ends_with(".tar.xz") || name.ends_with(".txz") {
            return Some(ArchiveFormat::TarXz);
        }
        if name.ends_with(".tar") {
            return Some(ArchiveFormat::Tar);
        }

        let mut head = Vec::with_capacity(USTAR_OFFSET + 5);
        fs::File::open(path)
            .and_then(|f| f.take((USTAR_OFFSET + 5) as u64).read_to_end(&mut head))
            .ok()?;
        let magic = head.as_slice();

        if magic.starts_with(b"PK\x03\x04") {
            Some(ArchiveFormat::Zip)
        } else if magic.starts_with(&[0x1f, 0x8b]) {
            Some(ArchiveFormat::TarGz)
        } else if magic.starts_with(&[0xfd, b'7', b'z', b'X', b'Z', 0x00]) {
            Some(ArchiveFormat::TarXz)
        } else if magic.get(USTAR_OFFSET..) == Some(b"ustar".as_slice()) {
            Some(ArchiveFormat::Tar)
        } else {
            None
        }
    }
}

/// Unpack `archive_path` into `destination`, or next to the archive when no
/// destination is given. Existing files are overwritten. Returns the
/// directory the archive was unpacked into.
pub fn extract_archive(
    archive_path: &Path,
    destination: Option<&Path>,
) -> Result<PathBuf, InstallError> {
    if !archive_path.is_file() {
        return Err(InstallError::extract(archive_path, "archive not found"));
    }

    let destination = match destination {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            dir.to_path_buf()
        }
        None => archive_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| InstallError::extract(archive_path, "archive has no parent directory"))?,
    };

    let format = ArchiveFormat::detect(archive_path)
        .ok_or_else(|| InstallError::extract(archive_path, "unsupported archive format"))?;

    tracing::info!(
        "Extracting {} ({:?}) into {}",
        archive_path.display(),
        format,
        destination.display()
    );

    match format {
        ArchiveFormat::Zip => extract_zip(archive_path, &destination),
        ArchiveFormat::Tar => {
            let file = fs::File::open(archive_path)?;
            unpack_tar(file, archive_path, &destination)
        }
        ArchiveFormat::TarGz => {
            let file = fs::File::open(archive_path)?;
            unpack_tar(GzDecoder::new(file), archive_path, &destination)
        }
        ArchiveFormat::TarXz => {
            let file = fs::File::open(archive_path)?;
            unpack_tar(xz2::read::XzDecoder::new(file), archive_path, &destination)
        }
    }?;

    Ok(destination)
}

fn unpack_tar<R: Read>(
    reader: R,
    archive_path: &Path,
    extract_dir: &Path,
) -> Result<(), InstallError> {
    let mut archive = Archive::new(reader);
    archive.set_overwrite(true);
    archive
        .unpack(extract_dir)
        .map_err(|e| InstallError::extract(archive_path, e))
}

fn extract_zip(archive_path: &Path, extract_dir: &Path) -> Result<(), InstallError> {
    let file = fs::File::open(archive_path)?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| InstallError::extract(archive_path, e))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| InstallError::extract(archive_path, e))?;

        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            tracing::warn!("Skipping unsafe path in zip: {}", entry.name());
            continue;
        };
        let outpath = extract_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut outfile = fs::File::create(&outpath)?;
            io::copy(&mut entry, &mut outfile)
                .map_err(|e| InstallError::extract(archive_path, e))?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode))?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn tar_gz(entries: &[(&str, &str)]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (path, content) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o755);
            builder
                .append_data(&mut header, path, content.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn plain_tar(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, content) in entries {
            let mut header = tar::Header::new_ustar();
            header.set_size(content.len() as u64);
            header.set_mode(0o755);
            builder
                .append_data(&mut header, path, content.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap()
    }

    fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::FileOptions::default().unix_permissions(0o755);
        for (path, content) in entries {
            writer.start_file(*path, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extract_tar_gz_next_to_archive() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("oi-1.0.0.tar.gz");
        let bytes = tar_gz(&[("oi/oi", "#!/bin/sh\n"), ("oi/version.sh", "1.0.0")]);
        fs::write(&archive, bytes).unwrap();

        let out = extract_archive(&archive, None).unwrap();
        assert_eq!(out, dir.path());
        assert_eq!(fs::read_to_string(out.join("oi/version.sh")).unwrap(), "1.0.0");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(out.join("oi/oi")).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }

    #[test]
    fn test_extract_plain_tar() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("oi-1.0.0.tar");
        let bytes = plain_tar(&[("oi/oi", "#!/bin/sh\n"), ("oi/version.sh", "1.0.0")]);
        fs::write(&archive, bytes).unwrap();
        let dest = dir.path().join("out");

        let out = extract_archive(&archive, Some(&dest)).unwrap();
        assert_eq!(fs::read_to_string(out.join("oi/version.sh")).unwrap(), "1.0.0");
        assert!(out.join("oi/oi").is_file());

        // no extension, recognised by the ustar header
        let bare = dir.path().join("download");
        fs::write(&bare, plain_tar(&[("oi/version.sh", "1.0.0")])).unwrap();
        assert_eq!(ArchiveFormat::detect(&bare), Some(ArchiveFormat::Tar));
    }

    #[test]
    fn test_extract_zip_into_destination() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("oi-1.0.0.zip");
        let bytes = zip_bytes(&[("oi/oi", "#!/bin/sh\n"), ("oi/version.sh", "1.0.0")]);
        fs::write(&archive, bytes).unwrap();
        let dest = dir.path().join("nested").join("out");

        let out = extract_archive(&archive, Some(&dest)).unwrap();
        assert_eq!(out, dest);
        assert!(dest.join("oi/oi").is_file());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(dest.join("oi/oi")).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn test_reextract_overwrites() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out");
        let archive = dir.path().join("payload.tar.gz");

        fs::write(&archive, tar_gz(&[("oi/version.sh", "1.0.0")])).unwrap();
        extract_archive(&archive, Some(&dest)).unwrap();
        fs::write(&archive, tar_gz(&[("oi/version.sh", "2.0.0")])).unwrap();
        extract_archive(&archive, Some(&dest)).unwrap();

        assert_eq!(fs::read_to_string(dest.join("oi/version.sh")).unwrap(), "2.0.0");
    }

    #[test]
    fn test_detects_format_from_magic_bytes() {
        let dir = TempDir::new().unwrap();
        let gz = dir.path().join("download");
        fs::write(&gz, tar_gz(&[("oi/version.sh", "1.0.0")])).unwrap();
        let zip = dir.path().join("download-2");
        fs::write(&zip, zip_bytes(&[("oi/version.sh", "1.0.0")])).unwrap();

        assert_eq!(ArchiveFormat::detect(&gz), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::detect(&zip), Some(ArchiveFormat::Zip));

        let out = extract_archive(&gz, Some(&dir.path().join("out"))).unwrap();
        assert!(out.join("oi/version.sh").is_file());
    }

    #[test]
    fn test_missing_archive_fails() {
        let dir = TempDir::new().unwrap();
        let err = extract_archive(&dir.path().join("absent.tar.gz"), None).unwrap_err();
        assert!(matches!(err, InstallError::Extract { .. }));
    }

    #[test]
    fn test_corrupt_archive_fails() {
        let dir = TempDir::new().unwrap();
        let zip = dir.path().join("broken.zip");
        fs::write(&zip, b"PK\x03\x04 definitely not a zip").unwrap();
        assert!(matches!(
            extract_archive(&zip, None).unwrap_err(),
            InstallError::Extract { .. }
        ));

        let tgz = dir.path().join("broken.tar.gz");
        fs::write(&tgz, b"not gzip at all").unwrap();
        assert!(matches!(
            extract_archive(&tgz, None).unwrap_err(),
            InstallError::Extract { .. }
        ));
    }

    #[test]
    fn test_unknown_format_fails() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("notes.txt");
        fs::write(&file, "hello").unwrap();
        assert!(matches!(
            extract_archive(&file, None).unwrap_err(),
            InstallError::Extract { .. }
        ));
    }
}
