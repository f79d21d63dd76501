use crate::db::{ClaimOperations, DonationOperations, FoodOperations};
use actix_web::web;
use tokio::time::{interval, Duration};

/// Periodic pass over time-driven transitions: item deactivation, lapsed
/// reservations and the donation pool.
pub async fn run_expiry_sweeper(
    food_ops: FoodOperations,
    claim_ops: ClaimOperations,
    donation_ops: DonationOperations,
    period_secs: u64,
) {
    let mut tick = interval(Duration::from_secs(period_secs.max(1)));
    loop {
        tick.tick().await;

        match web::block({
            let food_ops = food_ops.clone();
            move || food_ops.reconcile()
        })
        .await
        {
            Ok(Ok(outcome)) => {
                if outcome.deactivated + outcome.reactivated > 0 {
                    info!(
                        "Background sweep: {} items deactivated, {} reactivated",
                        outcome.deactivated, outcome.reactivated
                    );
                }
            }
            Ok(Err(e)) => error!("Background sweep error: {}", e),
            Err(e) => error!("Background sweep blocking error: {}", e),
        }

        match web::block({
            let claim_ops = claim_ops.clone();
            move || claim_ops.expire_lapsed_claims()
        })
        .await
        {
            Ok(Ok(count)) => {
                if count > 0 {
                    info!("Background sweep: expired {} lapsed reservations", count);
                }
            }
            Ok(Err(e)) => error!("Background claim expiry error: {}", e),
            Err(e) => error!("Background claim expiry blocking error: {}", e),
        }

        match web::block({
            let donation_ops = donation_ops.clone();
            move || donation_ops.transfer_expired_items()
        })
        .await
        {
            Ok(Ok(count)) => {
                if count > 0 {
                    info!("Background sweep: moved {} items to the donation pool", count);
                }
            }
            Ok(Err(e)) => error!("Background donation transfer error: {}", e),
            Err(e) => error!("Background donation transfer blocking error: {}", e),
        }
    }
}
