use criterion::{black_box, criterion_group, criterion_main, Criterion};
use inference_engine::{ObliviousEnsemble, PriceModel};

const WIDTH: usize = 420;
const TREES: usize = 500;
const DEPTH: usize = 6;

fn synthetic_model() -> ObliviousEnsemble {
    let trees: Vec<String> = (0..TREES)
        .map(|t| {
            let splits: Vec<String> = (0..DEPTH)
                .map(|d| {
                    format!(
                        r#"{{"split_type": "FloatFeature", "float_feature_index": {}, "border": {}}}"#,
                        (t * 7 + d * 13) % WIDTH,
                        (d as f64) * 0.25 - 0.5
                    )
                })
                .collect();
            let leaves: Vec<String> = (0..1 << DEPTH).map(|l| format!("{}.0", l * 10)).collect();
            format!(
                r#"{{"splits": [{}], "leaf_values": [{}]}}"#,
                splits.join(","),
                leaves.join(",")
            )
        })
        .collect();

    ObliviousEnsemble::from_json(&format!(
        r#"{{"oblivious_trees": [{}], "scale_and_bias": [1.0, [15000.0]]}}"#,
        trees.join(",")
    ))
    .unwrap()
}

fn bench_ensemble(c: &mut Criterion) {
    let model = synthetic_model();
    let features: Vec<f64> = (0..WIDTH).map(|i| ((i % 5) as f64) * 0.3 - 0.6).collect();

    c.bench_function("ensemble_predict", |b| {
        b.iter(|| model.predict(black_box(&features)).unwrap())
    });
}

criterion_group!(benches, bench_ensemble);
criterion_main!(benches);
