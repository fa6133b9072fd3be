pub mod zipcode;
