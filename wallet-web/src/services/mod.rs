//! Browser services

pub mod city_codes;
pub mod ethereum;
