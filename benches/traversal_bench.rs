use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use treelint::check::check_tree_blocking;
use treelint::{BasicEngine, Engine, LintOptions, PathClassifier, Traversal, TraversalConfig};

const SAMPLE: &str = r#"
var counter = 0;
function increment(step) {
    counter = counter + step;
    if (counter == 10) {
        console.log("ten");
    }
    return counter;
}
increment(1);
"#;

fn sample_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    for d in 0..8 {
        let sub = dir.path().join(format!("pkg{}", d)).join("src");
        fs::create_dir_all(&sub).unwrap();
        for f in 0..16 {
            fs::write(sub.join(format!("mod{}.js", f)), SAMPLE).unwrap();
        }
        fs::write(sub.join("package.json"), "{\"name\": \"bench\"}\n").unwrap();
        fs::write(sub.join("README.md"), "# bench\n").unwrap();
    }
    dir
}

fn bench_engine(c: &mut Criterion) {
    let engine = BasicEngine::new();
    let options = LintOptions::default();
    let page = format!("<html>\n<script>\n{}</script>\n</html>\n", SAMPLE);
    let mut document = options.clone();
    document.browser = true;
    document.document = true;

    c.bench_function("engine_script", |b| {
        b.iter(|| black_box(engine.analyze(black_box(SAMPLE), &options)));
    });

    c.bench_function("engine_markup", |b| {
        b.iter(|| black_box(engine.analyze(black_box(&page), &document)));
    });
}

fn bench_classifier(c: &mut Criterion) {
    let classifier = PathClassifier::new();
    let paths = vec![
        "src/main.js",
        "package.json",
        "public/index.html",
        "README.md",
        "assets/logo.png",
    ];

    c.bench_function("path_classification", |b| {
        b.iter(|| {
            for path in &paths {
                black_box(classifier.classify(Path::new(path)));
            }
        });
    });
}

fn bench_tree(c: &mut Criterion) {
    let tree = sample_tree();
    let engine = BasicEngine::new();
    let options = LintOptions::default();
    let classifier = PathClassifier::new();

    c.bench_function("tree_blocking", |b| {
        b.iter(|| black_box(check_tree_blocking(tree.path(), &engine, &options, &classifier)));
    });

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let traversal = Traversal::new(Arc::new(BasicEngine::new()), LintOptions::default())
        .with_config(TraversalConfig {
            concurrency: 16,
            watchdog: None,
        });

    c.bench_function("tree_concurrent", |b| {
        b.iter(|| black_box(runtime.block_on(traversal.check(tree.path(), ()))));
    });
}

criterion_group!(benches, bench_engine, bench_classifier, bench_tree);
criterion_main!(benches);
