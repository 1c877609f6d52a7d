//! Benchmarks for mode-change parsing and session dispatch.

use chrono::{DateTime, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use irc_engine::{parse_mode_changes, render_mode_changes, Message, ModePolicy, Session};

/// A single membership grant
const SIMPLE_MODES: (&str, &[&str]) = ("+o", &["alice"]);

/// Mixed polarity with every argument class
const MIXED_MODES: (&str, &[&str]) = (
    "+ov-b+kl",
    &["alice", "bob", "*!*@spam.example", "sekrit", "50"],
);

/// A long run of argumentless settings
const FLAG_MODES: (&str, &[&str]) = ("+imnpst-imnpst", &[]);

fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn benchmark_mode_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Mode Parsing");
    let policy = ModePolicy::rfc_defaults();

    let cases = vec![
        ("simple_grant", SIMPLE_MODES),
        ("mixed_classes", MIXED_MODES),
        ("flag_run", FLAG_MODES),
    ];

    for (name, (modes, args)) in cases {
        group.bench_with_input(BenchmarkId::new("parse", name), &(modes, args), |b, input| {
            b.iter(|| {
                let changes =
                    parse_mode_changes(&policy, black_box(input.0), black_box(input.1)).unwrap();
                black_box(changes)
            })
        });
    }

    group.finish();
}

fn benchmark_mode_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("Mode Rendering");
    let policy = ModePolicy::rfc_defaults();

    let changes = parse_mode_changes(&policy, MIXED_MODES.0, MIXED_MODES.1).unwrap();

    group.bench_function("render_mixed", |b| {
        b.iter(|| {
            let rendered = render_mode_changes(black_box(&changes));
            black_box(rendered)
        })
    });

    group.finish();
}

fn benchmark_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("Session Dispatch");

    let join: Message = ":mynick!me@host JOIN #rust".parse().unwrap();
    let ping: Message = "PING :irc.example.com".parse().unwrap();
    let mode: Message = ":oper!o@h MODE #rust +ov-b alice bob *!*@spam.example"
        .parse()
        .unwrap();
    let names: Message = ":server 353 mynick = #rust :@alice +bob carol dave emily"
        .parse()
        .unwrap();
    let end_names: Message = ":server 366 mynick #rust :End of /NAMES list."
        .parse()
        .unwrap();

    group.bench_function("ping_pong", |b| {
        let mut session = Session::new("bench", "mynick", t0());
        b.iter(|| {
            let out = session.handle_message(t0(), black_box(&ping));
            black_box(out)
        })
    });

    group.bench_function("channel_mode", |b| {
        let mut session = Session::new("bench", "mynick", t0());
        session.handle_message(t0(), &join);
        b.iter(|| {
            let out = session.handle_message(t0(), black_box(&mode));
            black_box(out)
        })
    });

    group.bench_function("names_burst", |b| {
        let mut session = Session::new("bench", "mynick", t0());
        session.handle_message(t0(), &join);
        b.iter(|| {
            session.handle_message(t0(), black_box(&names));
            let out = session.handle_message(t0(), black_box(&end_names));
            black_box(out)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_mode_parsing,
    benchmark_mode_rendering,
    benchmark_dispatch,
);

criterion_main!(benches);
