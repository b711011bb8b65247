use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rolematch::config::NormalizeOptions;
use rolematch::embedding::{EmbeddingMatcher, TitleEmbeddings, WordEmbeddings};
use rolematch::gazetteer::GazetteerStore;
use rolematch::normalizer::{normalize, NormalizerContext};
use rolematch::spell::SpellIndex;
use rolematch::substring::SubstringMatcher;
use std::collections::HashSet;

fn sample_title() -> &'static str {
    "procuro vaga de advogado jr em empresa de sao paulo, com urgencia!"
}

fn bench_normalize(c: &mut Criterion) {
    let gazetteer = GazetteerStore::load(&[]);
    let spell = SpellIndex::build(std::iter::empty());
    let dictionary: HashSet<String> = gazetteer.stopwords.iter().cloned().collect();
    let ctx = NormalizerContext {
        gazetteer: &gazetteer,
        spell: &spell,
        dictionary: &dictionary,
    };
    let options = NormalizeOptions::default();

    let mut group = c.benchmark_group("normalizer::normalize");
    group.bench_function("baseline", |b| {
        b.iter(|| normalize(black_box(sample_title()), &options, &ctx))
    });
    group.finish();
}

fn bench_substring_matcher(c: &mut Criterion) {
    let matcher = SubstringMatcher::build(
        ["advogado".to_string(), "advogado junior".to_string()],
        50,
        1,
        10,
        HashSet::new(),
    );

    let mut group = c.benchmark_group("substring::find");
    group.bench_function("baseline", |b| {
        b.iter(|| matcher.find(black_box("procuro vaga de advogado junior em empresa")))
    });
    group.finish();
}

fn bench_embedding_matcher(c: &mut Criterion) {
    let words = WordEmbeddings::load_shipped().expect("shipped word vectors parse");
    let titles = TitleEmbeddings::build(&words, ["advogado".to_string(), "medico".to_string()]);
    let matcher = EmbeddingMatcher::new(&words, &titles, 1, 0.90, HashSet::new());

    let mut group = c.benchmark_group("embedding::find");
    group.bench_function("baseline", |b| {
        b.iter(|| matcher.find(black_box("advogado")))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_normalize,
    bench_substring_matcher,
    bench_embedding_matcher
);
criterion_main!(benches);
