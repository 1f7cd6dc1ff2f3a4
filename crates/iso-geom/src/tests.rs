//! Unit tests for iso-geom.

#[cfg(test)]
mod projection {
    use iso_core::GeoPoint;
    use crate::{GeomError, Hemisphere, Identity, Projection, Utm};

    const MELBOURNE: GeoPoint = GeoPoint { lon: 144.9631, lat: -37.8136 };

    #[test]
    fn epsg_parsing() {
        let utm = Utm::from_epsg(32755).unwrap();
        assert_eq!(utm.zone(), 55);
        assert_eq!(utm.hemisphere(), Hemisphere::South);
        assert_eq!(utm.epsg(), 32755);
        assert!((utm.central_meridian() - 147.0).abs() < 1e-12);

        assert_eq!(Utm::from_epsg(32633).unwrap().hemisphere(), Hemisphere::North);
        assert!(matches!(Utm::from_epsg(4326), Err(GeomError::UnsupportedEpsg(4326))));
        assert!(matches!(Utm::from_epsg(32761), Err(GeomError::InvalidZone(61))));
        assert!(matches!(Utm::new(0, Hemisphere::North), Err(GeomError::InvalidZone(0))));
    }

    #[test]
    fn zone_for_point() {
        assert_eq!(Utm::for_point(MELBOURNE).unwrap().epsg(), 32755);
        assert_eq!(Utm::for_point(GeoPoint::new(-0.1, 51.5)).unwrap().epsg(), 32630);
        assert_eq!(Utm::for_point(GeoPoint::new(180.0, 10.0)).unwrap().zone(), 1);
    }

    #[test]
    fn central_meridian_on_equator() {
        let utm = Utm::new(55, Hemisphere::South).unwrap();
        let c = utm.forward(GeoPoint::new(147.0, 0.0));
        assert!((c.x - 500_000.0).abs() < 1e-6);
        assert!((c.y - 10_000_000.0).abs() < 1e-6);
    }

    #[test]
    fn melbourne_forward() {
        let utm = Utm::from_epsg(32755).unwrap();
        let c = utm.forward(MELBOURNE);
        assert!((c.x - 320_704.4).abs() < 1.0, "easting {}", c.x);
        assert!((c.y - 5_812_911.7).abs() < 1.0, "northing {}", c.y);
    }

    #[test]
    fn round_trip_near_identity() {
        let utm = Utm::from_epsg(32755).unwrap();
        for p in [
            MELBOURNE,
            GeoPoint::new(147.0, -37.8),
            GeoPoint::new(145.5, -38.4),
            GeoPoint::new(149.9, -30.0),
        ] {
            let back = utm.inverse(utm.forward(p));
            assert!((back.lon - p.lon).abs() < 1e-7, "{p} → {back}");
            assert!((back.lat - p.lat).abs() < 1e-7, "{p} → {back}");
        }
    }

    #[test]
    fn identity_is_identity() {
        let c = Identity.forward(MELBOURNE);
        assert_eq!((c.x, c.y), (MELBOURNE.lon, MELBOURNE.lat));
        assert_eq!(Identity.inverse(c), MELBOURNE);
    }
}

#[cfg(test)]
mod hull {
    use geo::{Area, Contains, Point};

    use iso_core::GeoPoint;
    use crate::{GeomError, Identity, Utm, enclosing_polygon};

    #[test]
    fn right_triangle() {
        let pts = [GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0), GeoPoint::new(0.0, 1.0)];
        let poly = enclosing_polygon(&pts, &Identity, 0.0).unwrap().unwrap();
        assert_eq!(poly.exterior().0.len(), 4);
        assert!((poly.unsigned_area() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn interior_points_dropped() {
        let pts = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(2.0, 0.0),
            GeoPoint::new(2.0, 2.0),
            GeoPoint::new(0.0, 2.0),
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(0.5, 1.5),
        ];
        let poly = enclosing_polygon(&pts, &Identity, 0.0).unwrap().unwrap();
        assert_eq!(poly.exterior().0.len(), 5);
        assert!((poly.unsigned_area() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn too_few_points() {
        assert!(enclosing_polygon(&[], &Identity, 0.0).unwrap().is_none());
        assert!(enclosing_polygon(&[GeoPoint::new(1.0, 1.0)], &Identity, 0.0).unwrap().is_none());
        let two = [GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)];
        assert!(enclosing_polygon(&two, &Identity, 0.0).unwrap().is_none());
    }

    #[test]
    fn collinear_and_coincident_have_no_area() {
        let line = [GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0), GeoPoint::new(2.0, 2.0)];
        assert!(enclosing_polygon(&line, &Identity, 0.0).unwrap().is_none());
        let same = [GeoPoint::new(3.0, 3.0); 4];
        assert!(enclosing_polygon(&same, &Identity, 0.0).unwrap().is_none());
    }

    #[test]
    fn buffered_single_point() {
        let utm = Utm::from_epsg(32755).unwrap();
        let origin = GeoPoint::new(144.9631, -37.8136);
        let poly = enclosing_polygon(&[origin], &utm, 150.0).unwrap().unwrap();
        assert!(poly.contains(&Point::new(origin.lon, origin.lat)));
        // Every ring vertex sits on the 150 m circle.
        for c in poly.exterior().coords() {
            let d = origin.distance_m(GeoPoint::new(c.x, c.y));
            assert!((d - 150.0).abs() < 1.0, "vertex at {d} m");
        }
    }

    #[test]
    fn buffering_grows_the_hull() {
        let pts = [GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0), GeoPoint::new(0.0, 1.0)];
        let bare = enclosing_polygon(&pts, &Identity, 0.0).unwrap().unwrap();
        let buffered = enclosing_polygon(&pts, &Identity, 0.1).unwrap().unwrap();
        assert!(buffered.unsigned_area() > bare.unsigned_area());
        for p in pts {
            assert!(buffered.contains(&Point::new(p.lon, p.lat)));
        }
    }

    #[test]
    fn invalid_radius() {
        let pts = [GeoPoint::new(0.0, 0.0)];
        assert!(matches!(
            enclosing_polygon(&pts, &Identity, -1.0),
            Err(GeomError::InvalidBufferRadius(_))
        ));
        assert!(enclosing_polygon(&pts, &Identity, f64::NAN).is_err());
        assert!(enclosing_polygon(&pts, &Identity, f64::INFINITY).is_err());
    }
}
