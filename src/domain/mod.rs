mod daily_bar;
mod symbol;
mod trade_date;

pub use daily_bar::{DailyBar, DailySeries};
pub use symbol::{Exchange, SecurityCode};
pub use trade_date::TradeDate;
