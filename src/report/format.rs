// src/report/format.rs

//! Human-readable rendering of build results.

use crate::build::{Asset, BuildResult, Problem};

/// Render one build result: time, hash and every emitted asset.
///
/// ```text
///
/// Build Time: 42ms
/// Build Hash: 9f86d081
/// Build Assets:
/// 	main.js	1024
/// ```
pub fn format(result: &BuildResult) -> String {
    let assets: Vec<String> = result.emitted_assets().map(asset_line).collect();
    format!(
        "\nBuild Time: {}ms\nBuild Hash: {}\nBuild Assets:\n{}\n",
        result.time,
        result.hash,
        assets.join("\n")
    )
}

/// One report per child for multi-target results, otherwise one for the whole
/// result.
pub fn format_list(result: &BuildResult) -> Vec<String> {
    result.parts().into_iter().map(format).collect()
}

/// Render errors or warnings, one problem per block.
pub fn format_problems<'a>(problems: impl IntoIterator<Item = &'a Problem>) -> String {
    problems
        .into_iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn asset_line(asset: &Asset) -> String {
    format!("\t{}\t{}", asset.name, asset.size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str, size: u64, emitted: bool) -> Asset {
        Asset {
            name: name.to_string(),
            size,
            emitted,
        }
    }

    #[test]
    fn report_lists_only_emitted_assets() {
        let result = BuildResult {
            time: 42,
            hash: "9f86d081".to_string(),
            assets: vec![asset("main.js", 1024, true), asset("vendor.js", 5000, false)],
            ..Default::default()
        };

        assert_eq!(
            format(&result),
            "\nBuild Time: 42ms\nBuild Hash: 9f86d081\nBuild Assets:\n\tmain.js\t1024\n"
        );
    }

    #[test]
    fn multi_target_renders_each_child() {
        let child = |hash: &str| BuildResult {
            hash: hash.to_string(),
            assets: vec![asset("out.js", 1, true)],
            ..Default::default()
        };
        let result = BuildResult {
            hash: "parent".to_string(),
            children: vec![child("one"), child("two")],
            ..Default::default()
        };

        let reports = format_list(&result);
        assert_eq!(reports.len(), 2);
        assert!(reports[0].contains("Build Hash: one"));
        assert!(reports[1].contains("Build Hash: two"));
        assert!(!reports.iter().any(|r| r.contains("parent")));
    }

    #[test]
    fn problems_are_separated_by_blank_lines() {
        let problems = [Problem::new("first"), Problem::new("second")];
        assert_eq!(format_problems(&problems), "first\n\nsecond");
    }
}
