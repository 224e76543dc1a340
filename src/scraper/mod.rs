mod permit_scraper;

pub use permit_scraper::PermitScraper;
