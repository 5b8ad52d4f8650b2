use anyhow::{Context, Result};
use arrow::array::{AsArray, BooleanArray, StringArray};
use arrow::compute::{and, filter};
use tracing::debug;

use crate::pattern::{DecodedFields, FieldDecoder, PathPattern};
use crate::sources::{
    Criteria, DataSource, DriverArgs, Metadata, PathAsPattern, PatternSource, Schema,
    SourceDescription, UrlPath,
};
use crate::utils::filesystem::expand_glob;

/// A catalog source backed by a list of files.
///
/// The list is either given explicitly or found by globbing a urlpath. When the
/// urlpath is also a template (`data/{date:%Y-%m-%d}.csv`) the fields it names
/// can be decoded from every file and used to [`subset`](FileSource::subset)
/// the source.
#[derive(Debug, Clone)]
pub struct FileSource {
    name: Option<String>,
    description: Option<String>,
    urlpath: UrlPath,
    original_urlpath: UrlPath,
    path_as_pattern: PathAsPattern,
    pattern: Option<PathPattern>,
    files: Vec<String>,
    metadata: Metadata,
}

impl FileSource {
    pub const DRIVER: &'static str = "files";

    /// Resolve `urlpath` into a file list.
    ///
    /// An explicit list is kept verbatim. A single urlpath is globbed (after
    /// replacing template fields with `*`) and the matches sorted; a glob that
    /// matches nothing, or is not a valid glob, gives an empty list. Only a
    /// malformed template is an error.
    pub fn new(
        urlpath: impl Into<UrlPath>,
        metadata: Option<Metadata>,
        path_as_pattern: impl Into<PathAsPattern>,
    ) -> Result<Self> {
        let original_urlpath = urlpath.into();
        let path_as_pattern = path_as_pattern.into();

        let pattern = match (&path_as_pattern, &original_urlpath) {
            (PathAsPattern::Template(template), _) => Some(PathPattern::parse(template)?),
            (PathAsPattern::Flag(true), UrlPath::Pattern(template)) => {
                Some(PathPattern::parse(template)?)
            }
            _ => None,
        };

        let urlpath = match (&path_as_pattern, &pattern) {
            (PathAsPattern::Flag(true), Some(pattern)) => UrlPath::Pattern(pattern.to_glob()),
            _ => original_urlpath.clone(),
        };

        let files = match &urlpath {
            UrlPath::Paths(paths) => paths.clone(),
            UrlPath::Pattern(glob) => expand_glob(glob),
        };

        debug!(
            urlpath = %original_urlpath,
            files = files.len(),
            pattern = pattern.as_ref().map(PathPattern::template),
            "resolved file source"
        );

        Ok(Self {
            name: None,
            description: None,
            urlpath,
            original_urlpath,
            path_as_pattern,
            pattern,
            files,
            metadata: metadata.unwrap_or_default(),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The urlpath files were resolved from (the glob form of a template).
    pub fn urlpath(&self) -> &UrlPath {
        &self.urlpath
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Per-file values of every pattern field; no fields without a pattern.
    pub fn decode_fields(&self) -> DecodedFields {
        match &self.pattern {
            Some(pattern) => pattern.reverse_formats(&self.files),
            None => DecodedFields::empty(self.files.len()),
        }
    }

    /// A new source holding only the files whose decoded fields satisfy every
    /// criterion.
    ///
    /// Criteria on fields the pattern does not declare are ignored, and an
    /// empty criteria map keeps every file. The new source keeps this source's
    /// name, metadata, pattern and original urlpath.
    pub fn subset(&self, criteria: &Criteria) -> Result<Self> {
        self.select(&self.decode_fields(), criteria)
    }

    /// Like [`subset`](FileSource::subset), decoding fields with `decoder`
    /// instead of this source's own pattern.
    pub fn subset_with(&self, decoder: &dyn FieldDecoder, criteria: &Criteria) -> Result<Self> {
        self.select(&decoder.reverse_formats(&self.files), criteria)
    }

    /// The `path_as_pattern` argument that rebuilds this source's listing and
    /// decoding from its original urlpath.
    fn described_path_as_pattern(&self) -> PathAsPattern {
        match (&self.pattern, &self.original_urlpath) {
            (Some(pattern), UrlPath::Pattern(urlpath)) if urlpath == pattern.template() => {
                PathAsPattern::Flag(true)
            }
            (Some(pattern), _) => PathAsPattern::Template(pattern.template().to_string()),
            (None, _) => PathAsPattern::Flag(false),
        }
    }

    fn select(&self, decoded: &DecodedFields, criteria: &Criteria) -> Result<Self> {
        let mut matched = BooleanArray::from(vec![true; self.files.len()]);

        if !self.files.is_empty() {
            for field in decoded.iter() {
                let Some(criterion) = criteria.get(&field.name) else {
                    continue;
                };

                let criterion = criterion.coerce(&field.name, &field.field_type)?;
                let field_match = criterion.mask(&field.values).with_context(|| {
                    format!("Failed to evaluate criterion on field {}", field.name)
                })?;
                matched = and(&matched, &field_match)?;
            }
        }

        for name in criteria.keys().filter(|name| decoded.get(name).is_none()) {
            debug!(field = %name, "ignoring criterion on a field the pattern does not declare");
        }

        let files = StringArray::from_iter_values(self.files.iter());
        let selected = filter(&files, &matched)?;
        let selected: Vec<String> = selected
            .as_string::<i32>()
            .iter()
            .flatten()
            .map(str::to_string)
            .collect();

        debug!(
            before = self.files.len(),
            after = selected.len(),
            "subset file source"
        );

        let mut subset = Self::new(selected, Some(self.metadata.clone()), true)?;
        subset.name = self.name.clone();
        subset.description = self.description.clone();
        subset.original_urlpath = self.original_urlpath.clone();
        subset.pattern = self.pattern.clone();
        Ok(subset)
    }
}

impl DataSource for FileSource {
    fn driver(&self) -> &str {
        Self::DRIVER
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn get_schema(&self) -> Schema {
        Schema::for_partitions(self.files.len())
    }

    fn describe(&self) -> SourceDescription {
        SourceDescription {
            name: self.name.clone(),
            driver: Self::DRIVER.to_string(),
            description: self.description.clone(),
            args: DriverArgs {
                urlpath: self.original_urlpath.clone(),
                path_as_pattern: self.described_path_as_pattern(),
            },
            metadata: self.metadata.clone(),
        }
    }
}

impl PatternSource for FileSource {
    fn path_as_pattern(&self) -> &PathAsPattern {
        &self.path_as_pattern
    }

    fn pattern(&self) -> Option<&PathPattern> {
        self.pattern.as_ref()
    }

    fn original_urlpath(&self) -> &UrlPath {
        &self.original_urlpath
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::sources::Criterion;
    use crate::utils::test_helpers::{
        file_helpers::{file_names, path_in, touch_files},
        test_data::{MONTHLY_PATTERN, monthly_csv_names},
    };

    fn monthly_source(months: &[u32]) -> (TempDir, FileSource) {
        let temp_dir = tempfile::tempdir().unwrap();
        let names = monthly_csv_names(months);
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        touch_files(temp_dir.path(), &names);

        let source =
            FileSource::new(path_in(temp_dir.path(), MONTHLY_PATTERN), None, true).unwrap();
        (temp_dir, source)
    }

    fn criteria(items: Vec<(&str, Criterion)>) -> Criteria {
        items
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn test_explicit_list_is_kept_verbatim() {
        let source = FileSource::new(vec!["b.csv", "a.csv", "c.csv"], None, true).unwrap();

        assert_eq!(source.files(), &["b.csv", "a.csv", "c.csv"]);
        assert!(source.pattern().is_none());
    }

    #[test]
    fn test_template_is_globbed_and_sorted() {
        let (temp_dir, source) = monthly_source(&[3, 1, 2]);
        touch_files(temp_dir.path(), &["notes.txt"]);

        assert_eq!(
            file_names(source.files()),
            vec![
                "data_2020-01-01.csv",
                "data_2020-02-01.csv",
                "data_2020-03-01.csv"
            ]
        );
        assert_eq!(
            source.urlpath(),
            &UrlPath::Pattern(path_in(temp_dir.path(), "data_*.csv"))
        );
        assert_eq!(
            source.original_urlpath(),
            &UrlPath::Pattern(path_in(temp_dir.path(), MONTHLY_PATTERN))
        );
    }

    #[test]
    fn test_no_matches_is_empty_not_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source =
            FileSource::new(path_in(temp_dir.path(), "missing_*.csv"), None, true).unwrap();

        assert!(source.files().is_empty());
        assert_eq!(source.get_schema().npartitions, 0);
    }

    #[test]
    fn test_malformed_template_is_an_error() {
        assert!(FileSource::new("data/{date.csv", None, true).is_err());
        // without pattern decoding the same text is just a glob
        assert!(FileSource::new("data/{date.csv", None, false).is_ok());
    }

    #[test]
    fn test_schema_counts_partitions() {
        let source = FileSource::new(vec!["a", "b", "c", "d"], None, false).unwrap();
        let schema = source.get_schema();

        assert_eq!(schema.npartitions, 4);
        assert_eq!(schema.shape, [None, Some(2)]);
        assert_eq!(source.discover(), schema);
    }

    #[test]
    fn test_subset_by_date_range() {
        let (_temp_dir, source) = monthly_source(&[1, 2, 3]);

        let subset = source
            .subset(&criteria(vec![(
                "date",
                Criterion::range("2020-02-01", "2020-03-01"),
            )]))
            .unwrap();

        assert_eq!(file_names(subset.files()), vec!["data_2020-02-01.csv"]);
    }

    #[test]
    fn test_subset_by_scalar_and_list() {
        let (_temp_dir, source) = monthly_source(&[1, 2, 3, 4]);

        let scalar = source
            .subset(&criteria(vec![("date", Criterion::equals("2020-03-01"))]))
            .unwrap();
        assert_eq!(file_names(scalar.files()), vec!["data_2020-03-01.csv"]);

        let list = source
            .subset(&criteria(vec![(
                "date",
                Criterion::one_of(["2020-01-01", "2020-04-01", "2021-01-01"]),
            )]))
            .unwrap();
        assert_eq!(
            file_names(list.files()),
            vec!["data_2020-01-01.csv", "data_2020-04-01.csv"]
        );
    }

    #[test]
    fn test_subset_without_criteria_keeps_everything() {
        let (_temp_dir, source) = monthly_source(&[1, 2]);
        let subset = source.subset(&Criteria::new()).unwrap();
        assert_eq!(subset.files(), source.files());
    }

    #[test]
    fn test_subset_ignores_unknown_fields() {
        let (_temp_dir, source) = monthly_source(&[1, 2]);
        let subset = source
            .subset(&criteria(vec![("region", Criterion::equals("us"))]))
            .unwrap();
        assert_eq!(subset.files(), source.files());
    }

    #[test]
    fn test_subset_preserves_provenance() {
        let (_temp_dir, source) = monthly_source(&[1, 2, 3]);
        let mut metadata = Metadata::new();
        metadata.insert("owner".to_string(), json!("ops"));
        let source = FileSource::new(source.original_urlpath().clone(), Some(metadata), true)
            .unwrap()
            .with_name("monthly");

        let subset = source
            .subset(&criteria(vec![("date", Criterion::from_start("2020-02-01"))]))
            .unwrap();

        assert_eq!(subset.name(), Some("monthly"));
        assert_eq!(subset.metadata(), source.metadata());
        assert_eq!(subset.original_urlpath(), source.original_urlpath());
        assert_eq!(subset.path_as_pattern(), &PathAsPattern::Flag(true));
        assert_eq!(subset.urlpath(), &UrlPath::Paths(subset.files().to_vec()));
        assert_eq!(source.files().len(), 3);
    }

    #[test]
    fn test_subset_of_subset_keeps_decoding() {
        let (_temp_dir, source) = monthly_source(&[1, 2, 3, 4]);

        let first = source
            .subset(&criteria(vec![("date", Criterion::from_start("2020-02-01"))]))
            .unwrap();
        let second = first
            .subset(&criteria(vec![("date", Criterion::until("2020-04-01"))]))
            .unwrap();

        assert_eq!(
            file_names(second.files()),
            vec!["data_2020-02-01.csv", "data_2020-03-01.csv"]
        );
    }

    #[test]
    fn test_subset_intersects_fields() {
        let temp_dir = tempfile::tempdir().unwrap();
        touch_files(
            temp_dir.path(),
            &["us/1.csv", "us/2.csv", "eu/1.csv", "eu/2.csv"],
        );
        let source =
            FileSource::new(path_in(temp_dir.path(), "{region}/{run:d}.csv"), None, true).unwrap();

        let subset = source
            .subset(&criteria(vec![
                ("region", Criterion::equals("us")),
                ("run", Criterion::equals(2i64)),
            ]))
            .unwrap();

        assert_eq!(subset.files(), &[path_in(temp_dir.path(), "us/2.csv")]);
    }

    #[test]
    fn test_subset_drops_files_that_do_not_fit_the_template() {
        let source = FileSource::new(
            vec!["data_2020-01-01.csv", "data_latest.csv"],
            None,
            MONTHLY_PATTERN,
        )
        .unwrap();

        let constrained = source
            .subset(&criteria(vec![("date", Criterion::from_start("2000-01-01"))]))
            .unwrap();
        assert_eq!(constrained.files(), &["data_2020-01-01.csv"]);

        let unconstrained = source.subset(&Criteria::new()).unwrap();
        assert_eq!(unconstrained.files().len(), 2);
    }

    #[test]
    fn test_uncoercible_criterion_is_an_error() {
        let (_temp_dir, source) = monthly_source(&[1]);
        let result = source.subset(&criteria(vec![("date", Criterion::equals("soon"))]));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_source_subsets_without_coercion() {
        let source = FileSource::new(Vec::<String>::new(), None, MONTHLY_PATTERN).unwrap();
        let subset = source
            .subset(&criteria(vec![("date", Criterion::equals("soon"))]))
            .unwrap();
        assert!(subset.files().is_empty());
    }

    #[test]
    fn test_subset_with_external_decoder() {
        let source = FileSource::new(vec!["x/1.csv", "x/5.csv"], None, false).unwrap();
        let decoder = PathPattern::parse("x/{n:d}.csv").unwrap();

        let subset = source
            .subset_with(&decoder, &criteria(vec![("n", Criterion::from_start(3i64))]))
            .unwrap();
        assert_eq!(subset.files(), &["x/5.csv"]);
    }

    #[test]
    fn test_describe_uses_original_urlpath() {
        let source = FileSource::new("logs/{day:%Y%m%d}.log", None, true)
            .unwrap()
            .with_name("logs")
            .with_description("daily logs");
        let description = source.describe();

        assert_eq!(description.driver, "files");
        assert_eq!(description.name.as_deref(), Some("logs"));
        assert_eq!(description.description.as_deref(), Some("daily logs"));
        assert_eq!(
            description.args.urlpath,
            UrlPath::from("logs/{day:%Y%m%d}.log")
        );
    }

    #[test]
    fn test_subset_describes_a_rebuildable_source() {
        let temp_dir = tempfile::tempdir().unwrap();
        touch_files(temp_dir.path(), &["x/1.csv", "x/3.csv", "x/5.csv"]);
        let source = FileSource::new(
            path_in(temp_dir.path(), "x/*.csv"),
            None,
            path_in(temp_dir.path(), "x/{n:d}.csv"),
        )
        .unwrap();
        let at_least_three = criteria(vec![("n", Criterion::from_start(3i64))]);

        let subset = source.subset(&at_least_three).unwrap();
        let args = subset.describe().args;
        assert_eq!(args.urlpath, UrlPath::Pattern(path_in(temp_dir.path(), "x/*.csv")));
        assert_eq!(
            args.path_as_pattern,
            PathAsPattern::Template(path_in(temp_dir.path(), "x/{n:d}.csv"))
        );

        let rebuilt = FileSource::new(args.urlpath, None, args.path_as_pattern).unwrap();
        assert_eq!(rebuilt.files(), source.files());
        assert_eq!(rebuilt.decode_fields().num_fields(), 1);
        assert_eq!(
            rebuilt.subset(&at_least_three).unwrap().files(),
            subset.files()
        );
    }

    #[test]
    fn test_describe_of_template_urlpath_keeps_flag() {
        let (_temp_dir, source) = monthly_source(&[1, 2]);
        let subset = source
            .subset(&criteria(vec![("date", Criterion::equals("2020-02-01"))]))
            .unwrap();

        assert_eq!(subset.describe().args.path_as_pattern, PathAsPattern::Flag(true));
        assert_eq!(subset.describe().args.urlpath, *source.original_urlpath());

        let plain = FileSource::new(vec!["a.csv"], None, true).unwrap();
        assert_eq!(plain.describe().args.path_as_pattern, PathAsPattern::Flag(false));
    }

    #[test]
    fn test_glob_classes_and_double_star_decode_every_listed_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        touch_files(
            temp_dir.path(),
            &["a_1.csv", "b_2.csv", "c_3.csv", "data/x.csv", "data/a/y.csv"],
        );

        let classes =
            FileSource::new(path_in(temp_dir.path(), "[ab]_{n:d}.csv"), None, true).unwrap();
        assert_eq!(classes.files().len(), 2);
        let subset = classes
            .subset(&criteria(vec![("n", Criterion::from_start(0i64))]))
            .unwrap();
        assert_eq!(subset.files(), classes.files());

        let deep =
            FileSource::new(path_in(temp_dir.path(), "data/**/{name}.csv"), None, true).unwrap();
        assert_eq!(deep.files().len(), 2);
        let subset = deep
            .subset(&criteria(vec![("name", Criterion::one_of(["x", "y"]))]))
            .unwrap();
        assert_eq!(file_names(subset.files()), vec!["y.csv", "x.csv"]);
    }

    #[test]
    fn test_date_criterion_on_string_field() {
        let source = FileSource::new(
            vec!["2020-01-01/a.csv", "2020-02-01/b.csv"],
            None,
            "{day}/{name}.csv",
        )
        .unwrap();
        let day = chrono::NaiveDate::from_ymd_opt(2020, 2, 1).unwrap();

        let subset = source
            .subset(&criteria(vec![("day", Criterion::equals(day))]))
            .unwrap();
        assert_eq!(subset.files(), &["2020-02-01/b.csv"]);
    }

    #[test]
    fn test_decode_fields_without_pattern() {
        let source = FileSource::new(vec!["a.csv"], None, false).unwrap();
        let decoded = source.decode_fields();
        assert_eq!(decoded.num_fields(), 0);
        assert_eq!(decoded.len(), 1);
        assert_eq!(
            FileSource::new(vec!["a.csv"], None, "{name}.csv")
                .unwrap()
                .decode_fields()
                .num_fields(),
            1
        );
    }
}
