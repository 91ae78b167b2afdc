use vacancy_scout::boards::HhFamilyBoard;
use vacancy_scout::{init_logging, run_board, ScoutResult, SearchSettings};

#[tokio::main]
async fn main() -> ScoutResult<()> {
    init_logging();
    run_board(HhFamilyBoard::zarplata()?, SearchSettings::load_default()?).await
}
