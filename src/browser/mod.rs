mod headless;

pub use headless::launch;
