//! End-to-end pipeline tests: extract, filter, statistics, scores

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use mwex_cli::commands::extract::ExtractArgs;
use mwex_cli::commands::filter::FilterArgs;
use mwex_cli::commands::scores::ScoresArgs;
use mwex_cli::commands::statistics::StatisticsArgs;

const CORPUS: &str = "\
the|the|DT cat|cat|NN sat|sat|VB
the|the|DT cat|cat|NN ran|run|VB
the|the|DT cat|cat|NN sat|sat|VB
a|a|DT dog|dog|NN sat|sat|VB
";

fn write_corpus(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::File::create(&path)
        .unwrap()
        .write_all(content.as_bytes())
        .unwrap();
    path
}

fn extract_args(corpus: &Path, output: &Path) -> ExtractArgs {
    ExtractArgs {
        n: 2,
        corpus: corpus.to_path_buf(),
        output: output.to_path_buf(),
        dependency: false,
        surface: true,
        adjacent: true,
        distance_range: None,
        frequency_filter: None,
        lemma_filter: None,
        tag_filter: None,
    }
}

#[test]
fn test_extract_adjacent_bigrams() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = write_corpus(dir.path(), "corpus.txt", CORPUS);
    let out = dir.path().join("candidates.txt");

    mwex_cli::commands::extract::run(&extract_args(&corpus, &out)).unwrap();

    let content = fs::read_to_string(&out).unwrap();
    assert_eq!(
        content,
        "a|DT dog|NN\t1\n\
         cat|NN run|VB\t1\n\
         cat|NN sat|VB\t2\n\
         dog|NN sat|VB\t1\n\
         the|DT cat|NN\t3\n"
    );
}

#[test]
fn test_filter_by_frequency() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = write_corpus(dir.path(), "corpus.txt", CORPUS);
    let candidates = dir.path().join("candidates.txt");
    let filtered = dir.path().join("filtered.txt");

    mwex_cli::commands::extract::run(&extract_args(&corpus, &candidates)).unwrap();
    mwex_cli::commands::filter::run(&FilterArgs {
        n: 2,
        input: candidates,
        output: filtered.clone(),
        frequency_filter: Some("2-100".to_string()),
        lemma_filter: None,
        tag_filter: None,
        invert: false,
    })
    .unwrap();

    let content = fs::read_to_string(&filtered).unwrap();
    assert_eq!(content, "cat|NN sat|VB\t2\nthe|DT cat|NN\t3\n");
}

#[test]
fn test_filter_rejects_matches_when_inverted() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = write_corpus(dir.path(), "corpus.txt", CORPUS);
    let candidates = dir.path().join("candidates.txt");
    let filtered = dir.path().join("filtered.txt");

    mwex_cli::commands::extract::run(&extract_args(&corpus, &candidates)).unwrap();
    mwex_cli::commands::filter::run(&FilterArgs {
        n: 2,
        input: candidates,
        output: filtered.clone(),
        frequency_filter: None,
        lemma_filter: None,
        tag_filter: Some("DT:NN".to_string()),
        invert: true,
    })
    .unwrap();

    let content = fs::read_to_string(&filtered).unwrap();
    assert!(!content.contains("the|DT cat|NN"));
    assert!(!content.contains("a|DT dog|NN"));
    assert!(content.contains("cat|NN sat|VB"));
}

fn run_statistics(dir: &Path) -> PathBuf {
    let corpus = write_corpus(dir, "corpus.txt", CORPUS);
    let candidates = dir.join("candidates.txt");
    let filtered = dir.join("filtered.txt");
    let stats = dir.join("stats.txt");

    mwex_cli::commands::extract::run(&extract_args(&corpus, &candidates)).unwrap();
    mwex_cli::commands::filter::run(&FilterArgs {
        n: 2,
        input: candidates,
        output: filtered.clone(),
        frequency_filter: Some("2-100".to_string()),
        lemma_filter: None,
        tag_filter: None,
        invert: false,
    })
    .unwrap();
    mwex_cli::commands::statistics::run(&StatisticsArgs {
        n: 2,
        corpus,
        input: filtered,
        output: stats.clone(),
        dependency: false,
        surface: true,
        adjacent: true,
        distance_range: None,
        tag_filter: None,
        immediate: true,
        broad: true,
    })
    .unwrap();
    stats
}

#[test]
fn test_statistics_contingency_and_contexts() {
    let dir = tempfile::tempdir().unwrap();
    let stats = run_statistics(dir.path());

    let content = fs::read_to_string(&stats).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    // 6 unigram lines, then the two surviving candidates
    assert_eq!(lines.len(), 8);
    assert_eq!(lines[0], "a|DT\t1\tdog|NN:1 sat|VB:1");
    assert_eq!(lines[1], "cat|NN\t3\trun|VB:1 sat|VB:2 the|DT:3");
    assert_eq!(lines[4], "sat|VB\t3\ta|DT:1 cat|NN:2 dog|NN:1 the|DT:2");
    // (cat,sat): 2 occurrences out of N=5; left neighbor is always "the";
    // its own types were removed from the broad context
    assert_eq!(lines[6], "cat|NN sat|VB\t2 0 0 3\tthe|DT:2\t\tthe|DT:2");
    // (the,cat): sentence-initial, so no left context
    assert_eq!(
        lines[7],
        "the|DT cat|NN\t3 0 0 2\t\trun|VB:1 sat|VB:2\trun|VB:1 sat|VB:2"
    );
}

#[test]
fn test_scores_from_statistics() {
    let dir = tempfile::tempdir().unwrap();
    let stats = run_statistics(dir.path());
    let scores = dir.path().join("scores.txt");

    mwex_cli::commands::scores::run(&ScoresArgs {
        scores: vec![1, 22],
        input: stats,
        output: scores.clone(),
        smoothing: 0.5,
    })
    .unwrap();

    let content = fs::read_to_string(&scores).unwrap();
    assert_eq!(
        content,
        "cat|NN sat|VB\t0.400000 1.000000\nthe|DT cat|NN\t0.600000 1.000000\n"
    );
}

#[test]
fn test_scores_refuse_missing_context() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = write_corpus(dir.path(), "corpus.txt", CORPUS);
    let candidates = dir.path().join("candidates.txt");
    let stats = dir.path().join("stats.txt");
    let scores = dir.path().join("scores.txt");

    mwex_cli::commands::extract::run(&extract_args(&corpus, &candidates)).unwrap();
    // No contexts extracted at all
    mwex_cli::commands::statistics::run(&StatisticsArgs {
        n: 2,
        corpus,
        input: candidates,
        output: stats.clone(),
        dependency: false,
        surface: true,
        adjacent: true,
        distance_range: None,
        tag_filter: None,
        immediate: false,
        broad: false,
    })
    .unwrap();

    let result = mwex_cli::commands::scores::run(&ScoresArgs {
        scores: vec![57],
        input: stats,
        output: scores,
        smoothing: 0.5,
    });
    assert!(result.is_err());
}

#[test]
fn test_gzip_candidate_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = write_corpus(dir.path(), "corpus.txt", CORPUS);
    let plain = dir.path().join("candidates.txt");
    let compressed = dir.path().join("candidates.gz");

    mwex_cli::commands::extract::run(&extract_args(&corpus, &plain)).unwrap();
    mwex_cli::commands::extract::run(&extract_args(&corpus, &compressed)).unwrap();

    // The compressed list decodes to the exact same records
    let mut plain_reader = mwex_io::CandidateFileReader::open(&plain).unwrap();
    let mut gz_reader = mwex_io::CandidateFileReader::open(&compressed).unwrap();
    loop {
        let a = plain_reader.next_record().unwrap();
        let b = gz_reader.next_record().unwrap();
        assert_eq!(a, b);
        if a.is_none() {
            break;
        }
    }
}

#[test]
fn test_dependency_pipeline_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = write_corpus(
        dir.path(),
        "dep.txt",
        "a|a|A|1|0 b|b|A|2|1 c|c|A|3|1 d|d|A|4|2\n",
    );
    let candidates = dir.path().join("candidates.txt");
    let stats = dir.path().join("stats.txt");

    mwex_cli::commands::extract::run(&ExtractArgs {
        n: 2,
        corpus: corpus.clone(),
        output: candidates.clone(),
        dependency: true,
        surface: false,
        adjacent: false,
        distance_range: None,
        frequency_filter: None,
        lemma_filter: None,
        tag_filter: None,
    })
    .unwrap();

    let content = fs::read_to_string(&candidates).unwrap();
    assert_eq!(
        content,
        "a|A|1|0 b|A|2|1\t1\na|A|1|0 c|A|2|1\t1\nb|A|1|0 d|A|2|1\t1\n"
    );

    mwex_cli::commands::statistics::run(&StatisticsArgs {
        n: 2,
        corpus,
        input: candidates,
        output: stats.clone(),
        dependency: true,
        surface: false,
        adjacent: false,
        distance_range: None,
        tag_filter: None,
        immediate: false,
        broad: false,
    })
    .unwrap();

    let stats_content = fs::read_to_string(&stats).unwrap();
    let lines: Vec<&str> = stats_content.lines().collect();
    assert_eq!(lines.len(), 3);
    // Each loaded edge candidate was observed once; N = 3
    for line in &lines {
        let row = line.split('\t').nth(1).unwrap();
        let cells: Vec<i64> = row.split(' ').map(|v| v.parse().unwrap()).collect();
        assert_eq!(cells[0], 1);
        assert_eq!(cells.iter().sum::<i64>(), 3);
    }
}

#[test]
fn test_surface_distance_range_extends_candidates() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = write_corpus(dir.path(), "corpus.txt", "x|x|X y|y|Y z|z|Z\n");
    let out = dir.path().join("candidates.txt");

    let mut args = extract_args(&corpus, &out);
    args.adjacent = false;
    args.distance_range = Some("1-2".to_string());
    mwex_cli::commands::extract::run(&args).unwrap();

    let content = fs::read_to_string(&out).unwrap();
    assert_eq!(
        content,
        "x|X y|Y\t1\nx|X z|Z\t1\ny|Y z|Z\t1\n"
    );
}
