use grouped_reduce::input::{load_payload, result_to_json};
use grouped_reduce::statistics::{aggregate, AggFunc, CATALOG};
use grouped_reduce::{select_engine, Engine, GroupIndex, NumArray, ReduceOptions};
use ndarray::{Array3, ArrayD};
use std::io::Write;
use tempfile::tempdir;

const ORDER_STATISTICS: [&str; 6] = ["median", "nanmedian", "quantile", "nanquantile", "mode", "nanmode"];

fn sample_cube() -> NumArray {
    // 2x3x6 cube with a sprinkling of NaNs
    let data = Array3::from_shape_fn((2, 3, 6), |(i, j, k)| {
        if (i + j + k) % 5 == 0 {
            f64::NAN
        } else {
            ((i * 31 + j * 17 + k * 7) % 13) as f64 * 0.25
        }
    });
    NumArray::from(data.into_dyn())
}

fn assert_close(a: &ArrayD<f64>, b: &ArrayD<f64>, context: &str) {
    assert_eq!(a.shape(), b.shape(), "{context}: shape");
    for (x, y) in a.iter().zip(b.iter()) {
        if x.is_nan() || y.is_nan() {
            assert!(x.is_nan() && y.is_nan(), "{context}: {x} vs {y}");
        } else {
            assert!((x - y).abs() < 1e-9, "{context}: {x} vs {y}");
        }
    }
}

#[test]
fn test_engines_agree_on_every_native_statistic() {
    let array = sample_cube();
    let idx = GroupIndex::new(vec![2, 0, -1, 2, 1, 0]);
    let options = ReduceOptions::new().size(4).fill_value(f64::NAN);

    for (name, entry) in CATALOG.iter().filter(|(n, _)| !ORDER_STATISTICS.contains(n)) {
        let vectorized = entry(&idx, &array, "vectorized", &options).expect("vectorized run");
        let compiled = entry(&idx, &array, "compiled", &options).expect("compiled run");
        assert_eq!(vectorized.shape(), &[2, 3, 4]);
        assert_eq!(vectorized.dtype(), compiled.dtype(), "{name}");
        assert_close(&vectorized.to_f64(), &compiled.to_f64(), name);
    }
}

#[test]
fn test_engines_agree_along_leading_axis() {
    let array = sample_cube();
    let idx = GroupIndex::new(vec![1, 1]);
    let options = ReduceOptions::new().axis(0);

    for func in AggFunc::ALL {
        let vectorized = select_engine("numpy")
            .and_then(|e| e.reduce(&idx, &array, func, &options))
            .expect("vectorized run");
        let compiled = select_engine("numba")
            .and_then(|e| e.reduce(&idx, &array, func, &options))
            .expect("compiled run");
        assert_eq!(vectorized.shape(), &[2, 3, 6]);
        assert_close(&vectorized.to_f64(), &compiled.to_f64(), func.as_str());
    }
}

#[test]
fn test_order_statistics_ignore_engine_choice() {
    let array = sample_cube();
    let idx = GroupIndex::new(vec![0, 0, 1, 1, 1, 2]);
    let options = ReduceOptions::new().q(0.75).fill_value(-1);

    for name in ORDER_STATISTICS {
        let reference = aggregate(name, &idx, &array, "vectorized", &options).expect("reference run");
        for engine in ["compiled", "not-an-engine"] {
            let other = aggregate(name, &idx, &array, engine, &options).expect("exact path ignores engine");
            assert_eq!(
                reference.to_f64().mapv(f64::to_bits),
                other.to_f64().mapv(f64::to_bits),
                "{name} with {engine}"
            );
        }
    }
}

#[test]
fn test_rows_are_reduced_independently() {
    let array = sample_cube();
    let idx = GroupIndex::new(vec![0, 1, 0, 1, 0, 1]);
    let full = aggregate("nansum", &idx, &array, "compiled", &ReduceOptions::new()).expect("full run");

    let NumArray::Float64(data) = &array else {
        panic!("sample cube is float64");
    };
    let row = data.slice(ndarray::s![1, 2, ..]).to_owned().into_dyn();
    let single = aggregate("nansum", &idx, &NumArray::from(row), "compiled", &ReduceOptions::new())
        .expect("row run");

    for group in 0..2 {
        assert_eq!(full.get(&[1, 2, group]), single.get(&[group]));
    }
}

#[test]
fn test_payload_file_round_trip() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("payload.json");
    {
        let mut file = std::fs::File::create(&path).expect("Failed to create payload");
        write!(
            file,
            r#"{{"group_idx": [0, 1], "values": [null, null], "dtype": "float32"}}"#
        )
        .expect("Failed to write payload");
    }

    let payload = load_payload(&path).expect("payload should parse");
    let options = ReduceOptions::new().fill_value(-1);
    let result = aggregate("nanlen", &payload.group_idx, &payload.array, "vectorized", &options)
        .expect("nanlen run");

    let doc = result_to_json(&result);
    assert_eq!(doc["dtype"], "int64");
    assert_eq!(doc["values"], serde_json::json!([-1, -1]));

    let missing = load_payload(&temp_dir.path().join("missing.json"));
    assert!(matches!(missing, Err(grouped_reduce::GroupAggError::IoError(_))));
}
