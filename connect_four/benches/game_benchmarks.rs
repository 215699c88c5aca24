use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use connect_four::{
    Board, GameConfig, PlayerId, TurnAuthority,
    game::{check_win, find_winning_line},
};
use std::hint::black_box;

/// Fill a board column by column with alternating owners, stopping short of any line
/// longer than 3 in a column.
fn crowded_board(config: &GameConfig) -> Board {
    let mut board = Board::new(config);
    for column in 0..config.columns {
        for row in 0..config.rows {
            let player = if (row / 2 + column) % 2 == 0 {
                PlayerId::PlayerA
            } else {
                PlayerId::PlayerB
            };
            board.place(column, player).unwrap();
        }
    }
    board
}

/// Play round-robin columns until the match ends
fn play_out(config: &GameConfig) -> TurnAuthority {
    let mut authority = TurnAuthority::with_first_player(config.clone(), PlayerId::PlayerA);
    let mut column = 0;
    while !authority.is_terminal() {
        let player = authority.current_player();
        // Full columns are rejected and skipped
        authority.request_drop(player, column);
        column = (column + 1) % config.columns;
    }
    authority
}

fn bench_win_scan_empty(c: &mut Criterion) {
    let config = GameConfig::default();
    let board = Board::new(&config);

    c.bench_function("win_scan_empty_board", |b| {
        b.iter(|| check_win(black_box(&board), black_box(&config)));
    });
}

fn bench_win_scan_full(c: &mut Criterion) {
    let mut group = c.benchmark_group("win_scan_full_board");

    for size in [4usize, 6, 8] {
        let config = GameConfig::new(size, size, 4, true);
        let board = crowded_board(&config);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{size}x{size}")),
            &board,
            |b, board| b.iter(|| find_winning_line(black_box(board), black_box(&config))),
        );
    }

    group.finish();
}

fn bench_full_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_match");

    for diagonal in [true, false] {
        let config = GameConfig::new(6, 7, 4, diagonal);
        group.bench_with_input(
            BenchmarkId::from_parameter(if diagonal { "diagonal" } else { "straight" }),
            &config,
            |b, config| b.iter(|| play_out(black_box(config))),
        );
    }

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let authority = play_out(&GameConfig::default());

    c.bench_function("match_snapshot", |b| {
        b.iter(|| black_box(&authority).snapshot());
    });
}

criterion_group!(win_detection, bench_win_scan_empty, bench_win_scan_full);

criterion_group!(match_operations, bench_full_match, bench_snapshot);

criterion_main!(win_detection, match_operations);
