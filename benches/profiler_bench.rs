use criterion::{criterion_group, criterion_main, Criterion};

use domlens::{profiler, scanner, AnalysisConfig, DomTree};

// A synthetic page wide and deep enough to make the walks measurable.
fn synthetic_page(sections: usize) -> String {
    let mut html = String::from("<html><head><title>bench</title></head><body>");
    for i in 0..sections {
        html.push_str(&format!("<section id=\"s{}\"><h2>Section {}</h2><ul>", i, i));
        for j in 0..25 {
            html.push_str(&format!(
                "<li class=\"item\"><a href=\"#{}\">link {}</a></li>",
                j, j
            ));
        }
        html.push_str("</ul><div style=\"display:none\"><span>hidden</span></div></section>");
    }
    html.push_str("</body></html>");
    html
}

fn bench_parse(c: &mut Criterion) {
    let html = synthetic_page(50);
    c.bench_function("parse_document", |b| b.iter(|| DomTree::parse(&html)));
}

fn bench_profile(c: &mut Criterion) {
    let tree = DomTree::parse(&synthetic_page(50));
    let body = tree.body().expect("body");
    let config = AnalysisConfig::default();
    c.bench_function("profile_body", |b| {
        b.iter(|| profiler::profile(&tree, body, &config))
    });
}

fn bench_reveal_hidden(c: &mut Criterion) {
    let tree = DomTree::parse(&synthetic_page(50));
    let body = tree.body().expect("body");
    c.bench_function("reveal_hidden", |b| {
        b.iter(|| {
            let mut scratch = tree.clone();
            scanner::reveal_hidden(&mut scratch, body)
        })
    });
}

criterion_group!(benches, bench_parse, bench_profile, bench_reveal_hidden);
criterion_main!(benches);
