use std::path::{Path, PathBuf};

/// Output path for a profile file: `<dir>/<input stem>.json`
pub fn json_filename_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "profile".to_string());
    output_dir.join(format!("{}.json", stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_filename_for_input() {
        let path = json_filename_for(Path::new("/data/2014053000/profile.txt"), Path::new("out"));
        assert_eq!(path, PathBuf::from("out/profile.json"));
    }

    #[test]
    fn test_json_filename_without_stem() {
        let path = json_filename_for(Path::new("/"), Path::new("out"));
        assert_eq!(path, PathBuf::from("out/profile.json"));
    }
}
