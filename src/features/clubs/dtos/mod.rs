pub mod club_dto;

pub use club_dto::{ClubResponseDto, GrantClubAdminDto, NearbyClubDto, NearbyClubsQuery};
