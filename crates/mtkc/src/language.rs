pub const LANG_ID: &str = "mtk-core@0.1.0";

pub mod limits {
    pub const MAX_SOURCE_BYTES: usize = 65_536;
    pub const MAX_ARGS: usize = 32;
    pub const MAX_COMBINATIONS: usize = 512;

    pub fn max_combinations() -> usize {
        match std::env::var("MTK_MAX_COMBINATIONS") {
            Ok(v) => v
                .parse::<usize>()
                .ok()
                .filter(|v| *v > 0)
                .unwrap_or(MAX_COMBINATIONS),
            Err(_) => MAX_COMBINATIONS,
        }
    }
}
