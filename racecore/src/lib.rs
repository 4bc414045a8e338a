pub mod core {
    pub mod clock;
    pub mod driver;
    pub mod driver_table;
    pub mod environment;
    pub mod event_generator;
    pub mod events;
    pub mod handle_race;
    pub mod race;
    pub mod race_control;
    pub mod snapshot;
    pub mod speed_model;
    pub mod track;
}
pub mod interfaces {
    pub mod consumer_interface;
    pub mod feed_interface;
}
pub mod post {
    pub mod race_result;
}
pub mod pre {
    pub mod check_sim_opts_pars;
    pub mod read_sim_pars;
    pub mod sim_opts;
}




#[cfg(test)]
mod driver_table_tests {
    use crate::core::driver_table::{DriverTable, TickRules};
    use crate::core::environment::Environment;
    use crate::test_pars::{get_sim_pars, FixedLaptimes};
    use helpers::general::is_permutation;

    fn get_rules() -> TickRules {
        TickRules {
            boost_allowed: false,
            boost_window: 0.0,
            t_boost_duration: 0.0,
        }
    }

    #[test]
    fn test_grid_positions() {
        let sim_pars = get_sim_pars(&["C", "A", "B"], 3);
        let driver_table = DriverTable::new(&sim_pars.driver_pars_all, 3, 5.0);
        assert_eq!(driver_table.len(), 3);
        assert_eq!(driver_table.get("C").unwrap().position, 1);
        assert_eq!(driver_table.get("A").unwrap().position, 2);
        assert_eq!(driver_table.get("B").unwrap().position, 3);
        assert!(driver_table.get("D").is_none());
    }
    #[test]
    fn test_ties_by_id() {
        let sim_pars = get_sim_pars(&["C", "B", "A"], 3);
        let driver_table = DriverTable::new(&sim_pars.driver_pars_all, 3, 0.0);
        assert_eq!(driver_table.get("A").unwrap().position, 1);
        assert_eq!(driver_table.get("B").unwrap().position, 2);
        assert_eq!(driver_table.get("C").unwrap().position, 3);
    }
    #[test]
    fn test_positions_permutation() {
        let sim_pars = get_sim_pars(&["A", "B", "C", "D"], 3);
        let mut driver_table = DriverTable::new(&sim_pars.driver_pars_all, 3, 5.0);
        let mut model = FixedLaptimes::new(&[("B", 9500.0), ("C", 9000.0), ("D", 8500.0)]);
        let env = Environment::default();

        for i in 0..400 {
            driver_table.tick(i as f64 * 100.0, 100.0, &env, &mut model, &get_rules());
            let positions: Vec<u32> = driver_table.iter().map(|driver| driver.position).collect();
            assert!(is_permutation(&positions));
        }

        // the fastest driver leads in the end
        assert_eq!(driver_table.get("D").unwrap().position, 1);
    }
    fn run_boost_ticks(boost_window: f64, boost_allowed: bool) -> DriverTable {
        let mut sim_pars = get_sim_pars(&["A", "B"], 3);
        for driver_pars in sim_pars.driver_pars_all.iter_mut() {
            driver_pars.boosts = 2;
        }
        let mut driver_table = DriverTable::new(&sim_pars.driver_pars_all, 3, 1.5);
        let mut model = FixedLaptimes::new(&[]);
        let env = Environment::default();
        let rules = TickRules {
            boost_allowed,
            boost_window,
            t_boost_duration: 300.0,
        };

        for i in 0..20 {
            driver_table.tick(i as f64 * 100.0, 100.0, &env, &mut model, &rules);

            // B is on track from the second time step on and 1.5% behind A
            if i == 1 && boost_allowed && boost_window >= 1.5 {
                assert!(driver_table.get("B").unwrap().boost_act());
                assert_eq!(driver_table.get("B").unwrap().boosts_left, 1);
            }
        }
        driver_table
    }

    #[test]
    fn test_boosts_within_window() {
        let driver_table = run_boost_ticks(2.0, true);

        // the leader has no car in front, B boosts again after the first activation ran out
        assert_eq!(driver_table.get("A").unwrap().boosts_left, 2);
        assert_eq!(driver_table.get("B").unwrap().boosts_left, 0);
    }
    #[test]
    fn test_boosts_outside_window() {
        let driver_table = run_boost_ticks(1.0, true);
        assert_eq!(driver_table.get("B").unwrap().boosts_left, 2);
    }
    #[test]
    fn test_boosts_not_allowed() {
        let driver_table = run_boost_ticks(2.0, false);
        assert_eq!(driver_table.get("B").unwrap().boosts_left, 2);
    }
    #[test]
    fn test_retire() {
        let sim_pars = get_sim_pars(&["A", "B"], 3);
        let mut driver_table = DriverTable::new(&sim_pars.driver_pars_all, 3, 5.0);
        assert!(driver_table.retire("A"));
        assert!(!driver_table.retire("A"));
        assert!(!driver_table.retire("X"));
        assert_eq!(driver_table.get("A").unwrap().position, 2);
        assert!(!driver_table.get_all_done());
        assert!(driver_table.retire("B"));
        assert!(driver_table.get_all_done());
    }
}

#[cfg(test)]
mod event_generator_tests {
    use crate::core::event_generator::{observe, GeneratorPars};
    use crate::core::events::EventKind;
    use crate::test_pars::{get_driver_state, get_snapshot};

    fn get_gen_pars() -> GeneratorPars {
        GeneratorPars {
            collision_threshold: 0.5,
        }
    }

    #[test]
    fn test_best_lap() {
        let mut driver_prev = get_driver_state("A", 1, 199.0);
        driver_prev.last_laptime = Some(92340.0);
        driver_prev.best_laptime = Some(92340.0);
        let mut driver_cur = get_driver_state("A", 1, 201.0);
        driver_cur.last_laptime = Some(91800.0);
        driver_cur.best_laptime = Some(91800.0);

        let events = observe(
            &get_snapshot(1000.0, vec![driver_prev]),
            &get_snapshot(1100.0, vec![driver_cur]),
            &get_gen_pars(),
        );

        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].kind,
            EventKind::LapComplete {
                agent_id: "A".to_owned(),
                lap: 2,
                lap_time: 91800.0,
                best_lap: true
            }
        );
        assert_eq!(events[0].kind.get_priority(), 3);
    }
    #[test]
    fn test_no_best_lap() {
        let mut driver_prev = get_driver_state("A", 1, 199.0);
        driver_prev.best_laptime = Some(92340.0);
        let mut driver_cur = get_driver_state("A", 1, 201.0);
        driver_cur.last_laptime = Some(92340.0);
        driver_cur.best_laptime = Some(92340.0);

        let events = observe(
            &get_snapshot(1000.0, vec![driver_prev]),
            &get_snapshot(1100.0, vec![driver_cur]),
            &get_gen_pars(),
        );

        // equal lap times are not a new best lap
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0].kind,
            EventKind::LapComplete { best_lap: false, .. }
        ));
        assert_eq!(events[0].kind.get_priority(), 5);
    }
    #[test]
    fn test_collision_once() {
        let snapshot_1 = get_snapshot(
            1000.0,
            vec![get_driver_state("A", 1, 10.6), get_driver_state("B", 2, 10.0)],
        );
        let snapshot_2 = get_snapshot(
            1100.0,
            vec![get_driver_state("A", 1, 50.4), get_driver_state("B", 2, 50.0)],
        );
        let snapshot_3 = get_snapshot(
            1200.0,
            vec![get_driver_state("A", 1, 51.0), get_driver_state("B", 2, 50.8)],
        );

        let events = observe(&snapshot_1, &snapshot_2, &get_gen_pars());
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].kind,
            EventKind::Collision {
                agents: ["A".to_owned(), "B".to_owned()],
                lap: 1
            }
        );

        // still overlapping -> same collision episode
        assert!(observe(&snapshot_2, &snapshot_3, &get_gen_pars()).is_empty());
    }
    #[test]
    fn test_no_collision_in_pits() {
        let mut driver_b = get_driver_state("B", 2, 50.0);
        driver_b.pit_state = crate::core::driver::PitState::Pitting;
        let snapshot_1 = get_snapshot(
            1000.0,
            vec![get_driver_state("A", 1, 40.0), get_driver_state("B", 2, 50.0)],
        );
        let snapshot_2 = get_snapshot(1100.0, vec![get_driver_state("A", 1, 50.2), driver_b]);
        let events = observe(&snapshot_1, &snapshot_2, &get_gen_pars());
        assert!(events
            .iter()
            .all(|event| !matches!(event.kind, EventKind::Collision { .. })));
    }
    #[test]
    fn test_overtake_once() {
        let snapshot_1 = get_snapshot(
            1000.0,
            vec![get_driver_state("A", 2, 20.0), get_driver_state("B", 1, 22.0)],
        );
        let snapshot_2 = get_snapshot(
            1100.0,
            vec![get_driver_state("A", 1, 24.0), get_driver_state("B", 2, 22.5)],
        );
        let snapshot_3 = get_snapshot(
            1200.0,
            vec![get_driver_state("A", 1, 28.0), get_driver_state("B", 2, 23.0)],
        );

        let events = observe(&snapshot_1, &snapshot_2, &get_gen_pars());
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].kind,
            EventKind::Overtake {
                overtaker: "A".to_owned(),
                overtaken: "B".to_owned(),
                position: 1
            }
        );
        assert!(observe(&snapshot_2, &snapshot_3, &get_gen_pars()).is_empty());
    }
    #[test]
    fn test_overtake_two_cars() {
        let snapshot_1 = get_snapshot(
            1000.0,
            vec![
                get_driver_state("A", 3, 28.0),
                get_driver_state("B", 1, 30.0),
                get_driver_state("C", 2, 29.0),
            ],
        );
        let snapshot_2 = get_snapshot(
            1100.0,
            vec![
                get_driver_state("A", 1, 32.0),
                get_driver_state("B", 2, 31.0),
                get_driver_state("C", 3, 30.0),
            ],
        );

        let events = observe(&snapshot_1, &snapshot_2, &get_gen_pars());
        let kinds: Vec<EventKind> = events.into_iter().map(|event| event.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::Overtake {
                    overtaker: "A".to_owned(),
                    overtaken: "B".to_owned(),
                    position: 1
                },
                EventKind::Overtake {
                    overtaker: "A".to_owned(),
                    overtaken: "C".to_owned(),
                    position: 1
                },
            ]
        );
    }
    #[test]
    fn test_overtake_two_pairs() {
        let snapshot_1 = get_snapshot(
            1000.0,
            vec![
                get_driver_state("A", 1, 40.0),
                get_driver_state("B", 2, 39.0),
                get_driver_state("C", 3, 30.0),
                get_driver_state("D", 4, 29.0),
            ],
        );
        let snapshot_2 = get_snapshot(
            1100.0,
            vec![
                get_driver_state("A", 2, 41.0),
                get_driver_state("B", 1, 42.0),
                get_driver_state("C", 4, 32.0),
                get_driver_state("D", 3, 33.0),
            ],
        );

        let events = observe(&snapshot_1, &snapshot_2, &get_gen_pars());
        let kinds: Vec<EventKind> = events.into_iter().map(|event| event.kind).collect();

        // front to back, one event per pair
        assert_eq!(
            kinds,
            vec![
                EventKind::Overtake {
                    overtaker: "B".to_owned(),
                    overtaken: "A".to_owned(),
                    position: 1
                },
                EventKind::Overtake {
                    overtaker: "D".to_owned(),
                    overtaken: "C".to_owned(),
                    position: 3
                },
            ]
        );
    }
    #[test]
    fn test_priority_order() {
        // A finishes, B completes a lap and passes C, the race starts (system event)
        let mut a_prev = get_driver_state("A", 1, 299.0);
        a_prev.best_laptime = Some(90000.0);
        let mut a_cur = get_driver_state("A", 1, 300.5);
        a_cur.last_laptime = Some(95000.0);
        a_cur.best_laptime = Some(90000.0);
        a_cur.finished = true;

        let mut b_prev = get_driver_state("B", 3, 199.0);
        b_prev.best_laptime = Some(90000.0);
        let mut b_cur = get_driver_state("B", 2, 200.5);
        b_cur.last_laptime = Some(95000.0);

        let c_prev = get_driver_state("C", 2, 199.5);
        let c_cur = get_driver_state("C", 3, 199.9);

        let snapshot_prev = get_snapshot(0.0, vec![a_prev, b_prev, c_prev]);
        let snapshot_cur = get_snapshot(100.0, vec![a_cur, b_cur, c_cur]);

        let events = observe(&snapshot_prev, &snapshot_cur, &get_gen_pars());
        let priorities: Vec<u8> = events.iter().map(|event| event.kind.get_priority()).collect();

        assert!(priorities.windows(2).all(|x| x[0] <= x[1]));
        assert!(matches!(events[0].kind, EventKind::AgentFinished { .. }));
        assert!(matches!(
            events.last().unwrap().kind,
            EventKind::System { .. }
        ));
        assert!(events
            .iter()
            .any(|event| matches!(event.kind, EventKind::Overtake { .. })));
    }
    #[test]
    fn test_finished_is_terminal() {
        let mut a_prev = get_driver_state("A", 1, 300.5);
        a_prev.finished = true;
        let mut a_cur = get_driver_state("A", 1, 401.0);
        a_cur.finished = true;
        a_cur.last_laptime = Some(80000.0);

        let events = observe(
            &get_snapshot(1000.0, vec![a_prev]),
            &get_snapshot(1100.0, vec![a_cur]),
            &get_gen_pars(),
        );
        assert!(events.is_empty());
    }
}

#[cfg(test)]
mod events_tests {
    use crate::core::events::{format_laptime, Event, EventKind};

    #[test]
    fn test_format_laptime() {
        assert_eq!(format_laptime(91800.0), "1:31.800");
        assert_eq!(format_laptime(5432.1), "0:05.432");
    }
    #[test]
    fn test_event_json() {
        let mut event = Event::new(
            1200.0,
            EventKind::BoostUsed {
                agent_id: "A".to_owned(),
                boosts_left: 2,
            },
        );
        event.seq = 7;
        let val = serde_json::to_value(&event).unwrap();
        assert_eq!(val["type"], "boost_used");
        assert_eq!(val["seq"], 7);
        assert_eq!(val["agent_id"], "A");

        let event_parsed: Event = serde_json::from_value(val).unwrap();
        assert_eq!(event_parsed, event);
    }
}

#[cfg(test)]
mod race_control_tests {
    use crate::core::environment::Weather;
    use crate::core::race_control::RaceControl;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            "sc on".parse::<RaceControl>().unwrap(),
            RaceControl::SafetyCar { deployed: true }
        );
        assert_eq!(
            " weather rain 18.5 ".parse::<RaceControl>().unwrap(),
            RaceControl::Weather {
                weather: Weather::Rain,
                temperature: 18.5
            }
        );
        assert_eq!("stop".parse::<RaceControl>().unwrap(), RaceControl::Stop);
        assert!("weather snow 0".parse::<RaceControl>().is_err());
        assert!("sc maybe".parse::<RaceControl>().is_err());
    }
}

#[cfg(test)]
mod check_pars_tests {
    use crate::pre::check_sim_opts_pars::{check_sim_opts_pars, check_sim_pars};
    use crate::pre::read_sim_pars::read_sim_pars;
    use crate::pre::sim_opts::SimOpts;
    use crate::test_pars::get_sim_pars;
    use std::path::PathBuf;

    fn get_sim_opts() -> SimOpts {
        SimOpts {
            debug: false,
            feed: false,
            json: false,
            no_sim_runs: 1,
            parfile_path: PathBuf::from("pars.json"),
            realtime_factor: 1.0,
            seed: None,
            timestep_size: 200.0,
        }
    }

    #[test]
    fn test_valid_pars() {
        assert!(check_sim_opts_pars(&get_sim_opts(), &get_sim_pars(&["A", "B"], 3)).is_ok());
    }
    #[test]
    fn test_invalid_opts() {
        let sim_pars = get_sim_pars(&["A", "B"], 3);

        let mut sim_opts = get_sim_opts();
        sim_opts.timestep_size = 5000.0;
        assert!(check_sim_opts_pars(&sim_opts, &sim_pars).is_err());

        let mut sim_opts = get_sim_opts();
        sim_opts.feed = true;
        sim_opts.no_sim_runs = 2;
        assert!(check_sim_opts_pars(&sim_opts, &sim_pars).is_err());
    }
    #[test]
    fn test_invalid_drivers() {
        assert!(check_sim_pars(&get_sim_pars(&[], 3)).is_err());
        assert!(check_sim_pars(&get_sim_pars(&["A", "A"], 3)).is_err());

        let mut sim_pars = get_sim_pars(&["A", "B"], 3);
        sim_pars.driver_pars_all[1].color = "no color".to_owned();
        assert!(check_sim_pars(&sim_pars).is_err());
    }
    #[test]
    fn test_demo_pars() {
        let mut filepath = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        filepath.push("../input/parameters/pars_demo.json");
        let sim_pars = read_sim_pars(filepath.as_path()).unwrap();

        assert_eq!(sim_pars.driver_pars_all.len(), 6);
        assert_eq!(sim_pars.race_control.len(), 3);
        assert!(check_sim_opts_pars(&get_sim_opts(), &sim_pars).is_ok());
    }
    #[test]
    fn test_invalid_race() {
        assert!(check_sim_pars(&get_sim_pars(&["A"], 0)).is_err());

        let mut sim_pars = get_sim_pars(&["A", "B"], 3);
        sim_pars.race_pars.crash_probability = 1.5;
        assert!(check_sim_pars(&sim_pars).is_err());
    }
}




#[cfg(test)]
mod speed_model_tests {
    use crate::core::driver::Driver;
    use crate::core::environment::{Environment, Weather};
    use crate::core::speed_model::{BaseSpeedModel, SpeedModel};
    use crate::test_pars::get_sim_pars;
    use approx::assert_ulps_eq;

    fn get_env(weather: Weather, temperature: f64, safety_car: bool) -> Environment {
        Environment {
            weather,
            temperature,
            safety_car,
        }
    }

    #[test]
    fn test_weather_and_temperature() {
        let sim_pars = get_sim_pars(&["A"], 3);
        let mut model = BaseSpeedModel::new(&sim_pars.track_pars, 1);
        let driver = Driver::new(&sim_pars.driver_pars_all[0], 1, 0.0);

        assert_ulps_eq!(
            model.laptime(&driver, &get_env(Weather::Clear, 25.0, false)),
            10000.0,
            epsilon = 1e-6
        );
        assert_ulps_eq!(
            model.laptime(&driver, &get_env(Weather::Rain, 25.0, false)),
            10800.0,
            epsilon = 1e-6
        );
        assert_ulps_eq!(
            model.laptime(&driver, &get_env(Weather::Clear, 17.5, false)),
            10050.0,
            epsilon = 1e-6
        );

        // constant outside the tabulated temperatures
        assert_ulps_eq!(
            model.laptime(&driver, &get_env(Weather::Clear, 60.0, false)),
            10150.0,
            epsilon = 1e-6
        );
    }
    #[test]
    fn test_fuel_monotonic() {
        let mut sim_pars = get_sim_pars(&["A"], 3);
        sim_pars.track_pars.s_fuel = 30.0;
        let mut model = BaseSpeedModel::new(&sim_pars.track_pars, 1);
        let mut driver = Driver::new(&sim_pars.driver_pars_all[0], 1, 0.0);
        let env = get_env(Weather::Clear, 25.0, false);

        let mut laptime_prev = 0.0;

        for i in 0..=10 {
            driver.fuel = i as f64 * 10.0;
            let laptime = model.laptime(&driver, &env);
            assert!(laptime > laptime_prev);
            laptime_prev = laptime;
        }
        assert_ulps_eq!(laptime_prev, 13000.0, epsilon = 1e-6);
    }
    #[test]
    fn test_boost_and_safety_car() {
        let mut sim_pars = get_sim_pars(&["A"], 3);
        sim_pars.driver_pars_all[0].boosts = 1;
        let mut model = BaseSpeedModel::new(&sim_pars.track_pars, 1);
        let mut driver = Driver::new(&sim_pars.driver_pars_all[0], 1, 0.0);

        driver.act_boost(3000.0);
        assert_ulps_eq!(
            model.laptime(&driver, &get_env(Weather::Clear, 25.0, false)),
            9500.0,
            epsilon = 1e-6
        );

        // the safety car enforces the minimum lap time
        assert_ulps_eq!(
            model.laptime(&driver, &get_env(Weather::Clear, 25.0, true)),
            13000.0,
            epsilon = 1e-6
        );
    }
    #[test]
    fn test_noise_limited() {
        let mut sim_pars = get_sim_pars(&["A"], 3);
        sim_pars.track_pars.laptime_std = 100.0;
        let mut model = BaseSpeedModel::new(&sim_pars.track_pars, 7);
        let mut driver = Driver::new(&sim_pars.driver_pars_all[0], 1, 0.0);
        let env = get_env(Weather::Clear, 25.0, false);

        let mut laptimes = vec![];

        for lap in 0..500 {
            driver.compl_laps = lap;
            let laptime = model.laptime(&driver, &env);

            // the variation is sampled once per lap
            assert_ulps_eq!(model.laptime(&driver, &env), laptime);
            assert!(9700.0 - 1e-6 <= laptime && laptime <= 10300.0 + 1e-6);
            laptimes.push(laptime);
        }

        let min = laptimes.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = laptimes.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!(max - min > 100.0);
    }
}
