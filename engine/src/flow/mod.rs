pub mod constprop;
pub mod shared;
