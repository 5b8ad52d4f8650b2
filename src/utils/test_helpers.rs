pub mod file_helpers {
    use std::fs;
    use std::path::Path;

    /// Create empty files (and their parent directories) under `root`.
    ///
    /// Returns the created paths as strings, in the order given.
    pub fn touch_files(root: &Path, relative: &[&str]) -> Vec<String> {
        relative
            .iter()
            .map(|rel| {
                let path = root.join(rel);
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).unwrap();
                }
                fs::write(&path, b"").unwrap();
                path.to_string_lossy().to_string()
            })
            .collect()
    }

    /// Path of `relative` under `root`, as a string.
    pub fn path_in(root: &Path, relative: &str) -> String {
        root.join(relative).to_string_lossy().to_string()
    }

    /// File names of `paths`, in order.
    pub fn file_names(paths: &[String]) -> Vec<String> {
        paths
            .iter()
            .map(|p| {
                Path::new(p)
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default()
            })
            .collect()
    }
}

pub mod test_data {
    /// `data_2020-MM-01.csv`, one name per listed month.
    pub fn monthly_csv_names(months: &[u32]) -> Vec<String> {
        months
            .iter()
            .map(|m| format!("data_2020-{m:02}-01.csv"))
            .collect()
    }

    pub const MONTHLY_PATTERN: &str = "data_{date:%Y-%m-%d}.csv";
}
