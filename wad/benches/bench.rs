use criterion::*;
use wad::{encode_pnames, WadBuilder, WadData, WadPatch, WadTexPatch, WadTexture};

fn synthetic_wad() -> Vec<u8> {
    let pixels = [96u8; 128];
    let column = vec![(0usize, &pixels[..])];
    let patch = WadPatch::encode(128, 0, 0, &vec![column; 64]);

    let textures: Vec<WadTexture> = (0..400)
        .map(|i| WadTexture {
            name: format!("TEX{i}"),
            width: 128,
            height: 128,
            patches: vec![
                WadTexPatch {
                    origin_x: 0,
                    origin_y: 0,
                    patch_index: 0,
                },
                WadTexPatch {
                    origin_x: 64,
                    origin_y: 0,
                    patch_index: 0,
                },
            ],
        })
        .collect();

    WadBuilder::iwad()
        .lump("PNAMES", encode_pnames(&["WALL00"]))
        .lump("TEXTURE1", WadTexture::encode_directory(&textures))
        .marker("P_START")
        .lump("WALL00", patch)
        .marker("P_END")
        .build()
}

fn bench_directory(c: &mut Criterion) {
    let bytes = synthetic_wad();
    c.bench_function("Read directory", |b| {
        b.iter(|| WadData::from_bytes(black_box(bytes.clone())))
    });
}

fn bench_textures(c: &mut Criterion) {
    let wad = WadData::from_bytes(synthetic_wad()).unwrap();
    c.bench_function("Parse TEXTURE1", |b| {
        b.iter(|| wad.texture_iter(black_box("TEXTURE1")))
    });
    c.bench_function("Parse patch", |b| {
        b.iter(|| wad.get_patch(black_box("WALL00")))
    });
}

criterion_group!(benches, bench_directory, bench_textures);
criterion_main!(benches);
