use indicatif::{ProgressBar,ProgressStyle};

pub fn query_pb(total_queries: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_queries);
    pb.set_style(ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {wide_bar} ({per_sec}) {pos:>7}/{len:7} queries {eta_precise}"));
    pb.enable_steady_tick(200);
    pb.set_draw_delta((total_queries / 1000).max(1));
    pb
}
