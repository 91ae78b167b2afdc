use vacancy_scout::boards::SuperJobBoard;
use vacancy_scout::{init_logging, run_board, ScoutResult, SearchSettings};

#[tokio::main]
async fn main() -> ScoutResult<()> {
    init_logging();
    run_board(SuperJobBoard::new()?, SearchSettings::load_default()?).await
}
