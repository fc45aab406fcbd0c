use webid_op::app;
use webid_op::error::AppError;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    app::run().await
}
