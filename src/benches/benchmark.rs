#[macro_use]
extern crate criterion;
extern crate modsettings;

use criterion::Criterion;
use modsettings::{
    BinaryVersion, Dictionary, LoadTime, PropertyTree, SettingsTemplate, decode, encode_to_vec,
};

/// A `mod-settings.dat` shaped tree with `per_group` settings in every load time group.
fn generate_settings_tree(per_group: usize) -> PropertyTree {
    let mut root = Dictionary::new();

    for load_time in LoadTime::ALL {
        let mut group = Dictionary::with_capacity(per_group);
        for i in 0..per_group {
            let value = match i % 4 {
                0 => PropertyTree::Bool(i % 8 == 0),
                1 => PropertyTree::Int(i as i32),
                2 => PropertyTree::Double(i as f64 / 4.0),
                _ => PropertyTree::String(format!("value-{}", i)),
            };
            let mut entry = Dictionary::with_capacity(1);
            entry.insert("value", value);
            group.insert(format!("{}-setting-{}", load_time, i), PropertyTree::Dictionary(entry));
        }
        root.insert(load_time.key(), PropertyTree::Dictionary(group));
    }

    PropertyTree::Dictionary(root)
}

fn criterion_benchmark(c: &mut Criterion) {
    let version = BinaryVersion::new(0, 17, 42, 4);
    let tree = generate_settings_tree(1000);
    let bytes = encode_to_vec(version, &tree).unwrap();

    c.bench_function("decode 3000 settings", |b| {
        b.iter(|| decode(&bytes).unwrap())
    });

    c.bench_function("encode 3000 settings", |b| {
        b.iter(|| encode_to_vec(version, &tree).unwrap())
    });

    c.bench_function("export and apply 3000 settings", |b| {
        b.iter(|| {
            let template = SettingsTemplate::from_settings_tree(&tree);
            let mut target = tree.clone();
            assert_eq!(template.apply_to_settings_tree(&mut target), 3000);
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
