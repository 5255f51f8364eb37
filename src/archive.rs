use crate::result::Result;
use flate2::Compression;
use flate2::write::GzEncoder;
use log::{debug, info};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A file written into an archive together with the name it was stored under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub source: PathBuf,
}

/// Container format, chosen from the destination file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

impl ArchiveFormat {
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            ArchiveFormat::TarGz
        } else {
            ArchiveFormat::Zip
        }
    }
}

trait ArchiveSink {
    fn append_file(&mut self, name: &str, source: &Path) -> Result<()>;
    fn finish(self: Box<Self>) -> Result<()>;
}

struct ZipSink {
    zip: ZipWriter<File>,
}

/// Entries of this size or more need zip64 extra fields
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

fn zip_options(len: u64) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644)
        .large_file(len >= ZIP64_THRESHOLD)
}

impl ArchiveSink for ZipSink {
    fn append_file(&mut self, name: &str, source: &Path) -> Result<()> {
        let mut f = File::open(source)?;
        let len = f.metadata()?.len();
        self.zip.start_file(name, zip_options(len))?;
        io::copy(&mut f, &mut self.zip)?;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<()> {
        let file = self.zip.finish()?;
        file.sync_all()?;
        Ok(())
    }
}

struct TarGzSink {
    tar: tar::Builder<GzEncoder<File>>,
}

impl ArchiveSink for TarGzSink {
    fn append_file(&mut self, name: &str, source: &Path) -> Result<()> {
        let mut f = File::open(source)?;
        self.tar.append_file(name, &mut f)?;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<()> {
        let enc = self.tar.into_inner()?;
        let file = enc.finish()?;
        file.sync_all()?;
        Ok(())
    }
}

fn open_sink(archive_path: &Path) -> Result<Box<dyn ArchiveSink>> {
    let file = File::create(archive_path)?;

    let sink: Box<dyn ArchiveSink> = match ArchiveFormat::from_path(archive_path) {
        ArchiveFormat::Zip => Box::new(ZipSink {
            zip: ZipWriter::new(file),
        }),
        ArchiveFormat::TarGz => Box::new(TarGzSink {
            tar: tar::Builder::new(GzEncoder::new(file, Compression::default())),
        }),
    };

    Ok(sink)
}

/// Base names already placed in one archive
#[derive(Default)]
struct StoredNames {
    seen: HashSet<String>,
}

impl StoredNames {
    /// Reserve `candidate`, renaming its final component if that base name is taken.
    ///
    /// The renamed base is `file_<index>_<name>`. Every file found under one
    /// directory source shares that source's index, so the renamed base can
    /// be taken as well; a counter is then inserted (`file_<index>_<n>_<name>`)
    /// until the base name is free.
    fn claim(&mut self, candidate: String, index: usize) -> String {
        let (dir, base) = match candidate.rsplit_once('/') {
            Some((dir, base)) => (Some(dir), base),
            None => (None, candidate.as_str()),
        };

        if self.seen.insert(base.to_string()) {
            return candidate;
        }

        let mut counter = 0;
        loop {
            let renamed = disambiguate(base, index, counter);
            if self.seen.insert(renamed.clone()) {
                return match dir {
                    Some(dir) => format!("{}/{}", dir, renamed),
                    None => renamed,
                };
            }
            counter += 1;
        }
    }
}

fn disambiguate(base: &str, index: usize, counter: usize) -> String {
    if counter == 0 {
        format!("file_{}_{}", index, base)
    } else {
        format!("file_{}_{}_{}", index, counter, base)
    }
}

/// `/`-separated path of `path` below `root`
fn relative_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Archive every file reachable from `sources` into `archive_path`.
///
/// Sources are processed in lexicographic order of their path strings.
/// Missing sources are skipped but keep their position, which is the index
/// used to rename an entry whose base name is already taken.
/// The destination is truncated and fully written before returning.
pub fn zip_list<P: AsRef<Path>>(
    archive_path: &Path,
    sources: &[P],
    log: bool,
) -> Result<Vec<ArchiveEntry>> {
    let mut sorted: Vec<PathBuf> = sources.iter().map(|p| p.as_ref().to_path_buf()).collect();
    sorted.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));

    let mut sink = open_sink(archive_path)?;
    let destination = fs::canonicalize(archive_path)?;

    let mut names = StoredNames::default();
    let mut entries = Vec::new();

    for (index, source) in sorted.iter().enumerate() {
        if !source.exists() {
            debug!("Skipping missing source {}", source.display());
            continue;
        }

        let candidates: Vec<(String, PathBuf)> = if source.is_dir() {
            let mut files = Vec::new();
            for entry in WalkDir::new(source).sort_by_file_name() {
                let entry = entry?;
                // links to regular files are archived with their target's content
                let is_file = entry.file_type().is_file()
                    || (entry.path_is_symlink() && entry.path().is_file());
                if is_file {
                    files.push((relative_name(source, entry.path()), entry.into_path()));
                }
            }
            files
        } else {
            vec![(base_name(source), source.clone())]
        };

        for (candidate, path) in candidates {
            // the archive may live inside a directory being archived
            if fs::canonicalize(&path)? == destination {
                continue;
            }

            let name = names.claim(candidate, index);
            sink.append_file(&name, &path)?;
            entries.push(ArchiveEntry { name, source: path });
        }
    }

    sink.finish()?;

    if log {
        info!("Adding: {:?} to: {}", sorted, destination.display());
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::io::Read;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn zip_names(archive: &Path) -> Vec<String> {
        let zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
        let mut names: Vec<String> = zip.file_names().map(|n| n.to_string()).collect();
        names.sort();
        names
    }

    fn zip_content(archive: &Path, name: &str) -> String {
        let mut zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
        let mut content = String::new();
        zip.by_name(name).unwrap().read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_distinct_base_names() {
        let tmp = TempDir::new().unwrap();
        let a = write(tmp.path(), "a/model.pkl", "model");
        let b = write(tmp.path(), "b/report.csv", "report");
        let out = tmp.path().join("out.zip");

        let entries = zip_list(&out, &[b, a], false).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(zip_names(&out), vec!["model.pkl", "report.csv"]);
        assert_eq!(zip_content(&out, "report.csv"), "report");
    }

    #[test]
    fn test_colliding_base_names_renamed_by_sorted_index() {
        let tmp = TempDir::new().unwrap();
        let b = write(tmp.path(), "b/report.csv", "second");
        let a = write(tmp.path(), "a/report.csv", "first");
        let out = tmp.path().join("out.zip");

        zip_list(&out, &[b, a], false).unwrap();

        assert_eq!(zip_names(&out), vec!["file_1_report.csv", "report.csv"]);
        assert_eq!(zip_content(&out, "report.csv"), "first");
        assert_eq!(zip_content(&out, "file_1_report.csv"), "second");
    }

    #[test]
    fn test_missing_source_keeps_its_index() {
        let tmp = TempDir::new().unwrap();
        let a = write(tmp.path(), "a/report.csv", "first");
        let missing = tmp.path().join("b/report.csv");
        let c = write(tmp.path(), "c/report.csv", "third");
        let out = tmp.path().join("out.zip");

        zip_list(&out, &[c, missing, a], false).unwrap();

        assert_eq!(zip_names(&out), vec!["file_2_report.csv", "report.csv"]);
    }

    #[test]
    fn test_duplicate_path_is_renamed() {
        let tmp = TempDir::new().unwrap();
        let model = write(tmp.path(), "results/model.pkl", "weights");
        let out = tmp.path().join("out.zip");

        zip_list(&out, &[model.clone(), model], false).unwrap();

        assert_eq!(zip_names(&out), vec!["file_1_model.pkl", "model.pkl"]);
    }

    #[test]
    fn test_empty_sources() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out.zip");

        let entries = zip_list::<PathBuf>(&out, &[], false).unwrap();

        assert!(entries.is_empty());
        assert!(zip_names(&out).is_empty());
    }

    #[test]
    fn test_only_missing_sources() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out.zip");

        zip_list(&out, &[tmp.path().join("missing.txt")], true).unwrap();

        assert!(zip_names(&out).is_empty());
    }

    #[test]
    fn test_directory_source_uses_relative_names() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("results");
        write(&dir, "hyperparameters.xlsx", "h");
        write(&dir, "kfold/split_0.csv", "k");
        let out = tmp.path().join("out.zip");

        zip_list(&out, &[&dir], false).unwrap();

        assert_eq!(
            zip_names(&out),
            vec!["hyperparameters.xlsx", "kfold/split_0.csv"]
        );
    }

    #[test]
    fn test_directory_files_share_top_level_index() {
        let tmp = TempDir::new().unwrap();
        let a = write(tmp.path(), "a/model.pkl", "top");
        let dir = tmp.path().join("b");
        write(&dir, "model.pkl", "nested");
        write(&dir, "scores.csv", "s");
        let out = tmp.path().join("out.zip");

        zip_list(&out, &[dir, a], false).unwrap();

        assert_eq!(
            zip_names(&out),
            vec!["file_1_model.pkl", "model.pkl", "scores.csv"]
        );
        assert_eq!(zip_content(&out, "file_1_model.pkl"), "nested");
    }

    #[test]
    fn test_nested_base_names_collide_across_folders() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("a_results");
        write(&dir, "fold0/model.pkl", "0");
        write(&dir, "fold1/model.pkl", "1");
        let b = write(tmp.path(), "b/model.pkl", "top");
        let out = tmp.path().join("out.zip");

        zip_list(&out, &[b, dir], false).unwrap();

        assert_eq!(
            zip_names(&out),
            vec!["file_1_model.pkl", "fold0/model.pkl", "fold1/file_0_model.pkl"]
        );
        assert_eq!(zip_content(&out, "fold1/file_0_model.pkl"), "1");
        assert_eq!(zip_content(&out, "file_1_model.pkl"), "top");
    }

    #[test]
    fn test_taken_renamed_name_gets_counter() {
        let tmp = TempDir::new().unwrap();
        let a = write(tmp.path(), "a/file_2_r.csv", "0");
        let b = write(tmp.path(), "b/r.csv", "1");
        let c = write(tmp.path(), "c/r.csv", "2");
        let out = tmp.path().join("out.zip");

        zip_list(&out, &[a, b, c], false).unwrap();

        assert_eq!(
            zip_names(&out),
            vec!["file_2_1_r.csv", "file_2_r.csv", "r.csv"]
        );
        assert_eq!(zip_content(&out, "file_2_1_r.csv"), "2");
    }

    #[test]
    fn test_archive_inside_archived_directory_is_skipped() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "data.txt", "d");
        let out = tmp.path().join("bundle.zip");

        zip_list(&out, &[tmp.path()], false).unwrap();

        assert_eq!(zip_names(&out), vec!["data.txt"]);
    }

    #[test]
    fn test_callers_order_untouched_and_output_stable() {
        let tmp = TempDir::new().unwrap();
        let b = write(tmp.path(), "b/x.txt", "b");
        let a = write(tmp.path(), "a/x.txt", "a");
        let sources = vec![b.clone(), a.clone()];
        let out = tmp.path().join("out.zip");

        zip_list(&out, &sources, false).unwrap();
        let first = zip_names(&out);
        zip_list(&out, &sources, false).unwrap();

        assert_eq!(sources, vec![b, a]);
        assert_eq!(first, zip_names(&out));
    }

    #[test]
    fn test_tar_gz_destination() {
        let tmp = TempDir::new().unwrap();
        let a = write(tmp.path(), "a/report.csv", "first");
        let b = write(tmp.path(), "b/report.csv", "second");
        let out = tmp.path().join("out.tar.gz");

        zip_list(&out, &[a, b], false).unwrap();

        let gz = flate2::read::GzDecoder::new(File::open(&out).unwrap());
        let mut tar = tar::Archive::new(gz);
        let mut names: Vec<String> = tar
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().to_string())
            .collect();
        names.sort();

        assert_eq!(names, vec!["file_1_report.csv", "report.csv"]);
    }

    #[test]
    fn test_unwritable_destination_fails() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("no/such/dir/out.zip");

        assert!(zip_list::<PathBuf>(&out, &[], false).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_in_directory_are_archived() {
        use std::os::unix::fs::symlink;

        let tmp = TempDir::new().unwrap();
        let real = write(tmp.path(), "real.csv", "linked content");
        let dir = tmp.path().join("res");
        write(&dir, "plain.csv", "plain");
        symlink(&real, dir.join("linked.csv")).unwrap();
        symlink(tmp.path().join("gone.csv"), dir.join("dangling.csv")).unwrap();
        let out = tmp.path().join("out.zip");

        zip_list(&out, &[&dir], false).unwrap();

        assert_eq!(zip_names(&out), vec!["linked.csv", "plain.csv"]);
        assert_eq!(zip_content(&out, "linked.csv"), "linked content");
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_source_aborts() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let secret = write(tmp.path(), "a/secret.csv", "s");
        fs::set_permissions(&secret, fs::Permissions::from_mode(0o000)).unwrap();
        if File::open(&secret).is_ok() {
            // permission bits are not enforced for root
            return;
        }
        let out = tmp.path().join("out.zip");

        let result = zip_list(&out, &[secret], false);

        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    #[ignore = "deflates a 4 GiB sparse file"]
    fn test_file_over_four_gib() {
        let tmp = TempDir::new().unwrap();
        let model = tmp.path().join("model.pkl");
        File::create(&model).unwrap().set_len(ZIP64_THRESHOLD + 17).unwrap();
        let out = tmp.path().join("out.zip");

        zip_list(&out, &[&model], false).unwrap();

        let mut zip = zip::ZipArchive::new(File::open(&out).unwrap()).unwrap();
        assert_eq!(zip.by_name("model.pkl").unwrap().size(), ZIP64_THRESHOLD + 17);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ArchiveFormat::from_path(Path::new("a.zip")), ArchiveFormat::Zip);
        assert_eq!(ArchiveFormat::from_path(Path::new("a.TGZ")), ArchiveFormat::TarGz);
        assert_eq!(ArchiveFormat::from_path(Path::new("a.tar.gz")), ArchiveFormat::TarGz);
        assert_eq!(ArchiveFormat::from_path(Path::new("results")), ArchiveFormat::Zip);
    }
}
